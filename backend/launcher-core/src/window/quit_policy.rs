/// Host platform, as far as quit conventions are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    Windows,
    Linux,
    Other,
}

impl Platform {
    pub const fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "linux") {
            Platform::Linux
        } else {
            Platform::Other
        }
    }

    /// Dock convention: the app stays alive with no windows until re-activated.
    pub const fn keeps_running_without_windows(self) -> bool {
        matches!(self, Platform::MacOs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuitDecision {
    Quit,
    StayAlive,
}

/// Decide what happens after a window closed, given how many remain open.
pub const fn decide_quit(platform: Platform, open_windows: usize) -> QuitDecision {
    if open_windows > 0 || platform.keeps_running_without_windows() {
        QuitDecision::StayAlive
    } else {
        QuitDecision::Quit
    }
}
