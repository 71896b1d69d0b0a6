use launcher_core::config::WindowConfig;
use launcher_core::error::window::WindowError;
use launcher_core::window::WindowHost;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Window host that records target URLs instead of opening windows.
#[derive(Clone, Default)]
pub struct FakeHost {
    opened: Arc<Mutex<Vec<String>>>,
    exits: Arc<AtomicUsize>,
}

impl FakeHost {
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }

    pub fn exits(&self) -> usize {
        self.exits.load(Ordering::SeqCst)
    }
}

impl WindowHost for FakeHost {
    type Window = String;

    fn create_window(&self, config: &WindowConfig) -> Result<String, WindowError> {
        self.opened.lock().unwrap().push(config.target_url.clone());
        Ok(config.target_url.clone())
    }

    fn request_exit(&self) {
        self.exits.fetch_add(1, Ordering::SeqCst);
    }
}
