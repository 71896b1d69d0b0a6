use crate::supervisor::signal::collect_descendants;

/// **VALUE**: Verifies the process-tree walk finds grandchildren.
///
/// **WHY THIS MATTERS**: With shell interpretation the server is the shell's child; only
/// signalling the shell would orphan Streamlit and keep port 8501 busy.
///
/// **BUG THIS CATCHES**: Would catch a walk that stops at direct children or includes
/// unrelated processes.
#[test]
fn given_shell_with_server_and_worker_when_collecting_then_returns_whole_subtree() {
    // GIVEN: sh(100) -> streamlit(101) -> worker(102), plus an unrelated process
    let processes = [
        (1, None),
        (100, Some(1)),
        (101, Some(100)),
        (102, Some(101)),
        (200, Some(1)),
    ];

    // WHEN: Collecting descendants of the shell
    let descendants = collect_descendants(100, &processes);

    // THEN: Children come before grandchildren, unrelated processes are excluded
    assert_eq!(descendants, vec![101, 102]);
}

#[test]
fn given_parent_cycle_when_collecting_then_terminates() {
    let processes = [(10, Some(11)), (11, Some(10))];

    let descendants = collect_descendants(10, &processes);

    assert_eq!(descendants, vec![11]);
}
