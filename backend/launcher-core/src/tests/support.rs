// Test doubles for the window host, the child lifecycle and the log.

use crate::config::WindowConfig;
use crate::error::window::WindowError;
use crate::supervisor::ChildLifecycle;
use crate::window::WindowHost;

use common::ErrorLocation;

use std::panic::Location;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};

use log::{Level, LevelFilter, Log, Metadata, Record};

/// Records every window it is asked to create.
#[derive(Clone, Default)]
pub(crate) struct RecordingHost {
    created: Arc<Mutex<Vec<String>>>,
    exits: Arc<AtomicUsize>,
    fail: Arc<AtomicBool>,
}

impl RecordingHost {
    pub(crate) fn created(&self) -> Vec<String> {
        self.created.lock().unwrap().clone()
    }

    pub(crate) fn exits(&self) -> usize {
        self.exits.load(Ordering::SeqCst)
    }

    pub(crate) fn fail_next(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }
}

impl WindowHost for RecordingHost {
    type Window = String;

    fn create_window(&self, config: &WindowConfig) -> Result<String, WindowError> {
        if self.fail.swap(false, Ordering::SeqCst) {
            return Err(WindowError::Create {
                message: String::from("host refused"),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        self.created.lock().unwrap().push(config.target_url.clone());
        Ok(config.target_url.clone())
    }

    fn request_exit(&self) {
        self.exits.fetch_add(1, Ordering::SeqCst);
    }
}

/// Counts terminate calls; behaves like a child that stops on the first one.
#[derive(Default)]
pub(crate) struct CountingChild {
    terminate_calls: AtomicUsize,
    running: AtomicBool,
}

impl CountingChild {
    pub(crate) fn running() -> Self {
        Self {
            terminate_calls: AtomicUsize::new(0),
            running: AtomicBool::new(true),
        }
    }

    pub(crate) fn absent() -> Self {
        Self::default()
    }

    pub(crate) fn terminate_calls(&self) -> usize {
        self.terminate_calls.load(Ordering::SeqCst)
    }
}

impl ChildLifecycle for CountingChild {
    fn terminate(&self) -> bool {
        self.terminate_calls.fetch_add(1, Ordering::SeqCst);
        self.running.swap(false, Ordering::SeqCst)
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// A log record as the diagnostic channel received it.
#[derive(Debug, Clone)]
pub(crate) struct CapturedRecord {
    pub level: Level,
    pub target: String,
    pub message: String,
}

/// Process-wide logger keeping every record. Tests run in parallel, so each
/// test filters by a label or message only it produces.
struct CapturingLogger {
    records: Mutex<Vec<CapturedRecord>>,
}

impl Log for CapturingLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        self.records.lock().unwrap().push(CapturedRecord {
            level: record.level(),
            target: record.target().to_string(),
            message: record.args().to_string(),
        });
    }

    fn flush(&self) {}
}

static CAPTURE: CapturingLogger = CapturingLogger {
    records: Mutex::new(Vec::new()),
};

static INSTALL_CAPTURE: Once = Once::new();

pub(crate) fn install_log_capture() {
    INSTALL_CAPTURE.call_once(|| {
        log::set_logger(&CAPTURE).expect("no other logger in the unit test binary");
        log::set_max_level(LevelFilter::Trace);
    });
}

pub(crate) fn captured_records() -> Vec<CapturedRecord> {
    CAPTURE.records.lock().unwrap().clone()
}
