use std::collections::{HashSet, VecDeque};

use log::trace;
use sysinfo::{Pid, ProcessesToUpdate, Signal, System};

/// Descendants of `root` in breadth-first order, given `(pid, parent)` pairs.
pub(crate) fn collect_descendants(root: u32, processes: &[(u32, Option<u32>)]) -> Vec<u32> {
    let mut seen = HashSet::from([root]);
    let mut queue = VecDeque::from([root]);
    let mut descendants = Vec::new();

    while let Some(parent) = queue.pop_front() {
        for &(pid, ppid) in processes {
            if ppid == Some(parent) && seen.insert(pid) {
                descendants.push(pid);
                queue.push_back(pid);
            }
        }
    }

    descendants
}

/// Send `signal` to `root` and every process below it, leaves first.
///
/// A shell-launched server sits one level below the shell, so signalling only
/// the direct child would orphan it. Falls back to a hard kill where the
/// platform has no equivalent for `signal`.
///
/// Returns the number of processes that accepted the signal.
pub(crate) fn signal_process_tree(root: u32, signal: Signal) -> usize {
    let mut sys = System::new();
    sys.refresh_processes(ProcessesToUpdate::All, true);

    let processes: Vec<(u32, Option<u32>)> = sys
        .processes()
        .iter()
        .map(|(pid, p)| (pid.as_u32(), p.parent().map(|parent| parent.as_u32())))
        .collect();

    let mut targets = collect_descendants(root, &processes);
    targets.reverse();
    targets.push(root);

    let mut signalled = 0;
    for pid in targets {
        let Some(process) = sys.process(Pid::from_u32(pid)) else {
            continue;
        };

        let sent = process.kill_with(signal).unwrap_or_else(|| process.kill());
        trace!("Sent {signal:?} to PID {pid}: success={sent}");

        if sent {
            signalled += 1;
        }
    }

    signalled
}
