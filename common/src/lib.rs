//! Shared building blocks for the launcher workspace.
//!
//! ## Architecture
//!
//! - **common** (this crate): error location tracking shared by every crate
//! - **launcher-core**: process supervision, readiness gating and window lifecycle
//! - **streamlit-desktop**: Tauri application wiring everything together

pub mod error;

pub use error::error_location::ErrorLocation;
