use streamlit_desktop::window_host::{ExitLatch, load_icon, parse_target_url};

use launcher_core::STREAMLIT_SERVER_URL;
use launcher_core::error::window::WindowError;

use std::path::PathBuf;

fn bundled_icon() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("icons")
        .join("icon.png")
}

/// **VALUE**: Verifies the bundled PNG decodes into a window icon.
///
/// **WHY THIS MATTERS**: The bundled icon is the fallback whenever the configured one is
/// missing; if it cannot be decoded the window has no icon at all.
#[test]
fn given_bundled_png_when_loading_icon_then_has_pixels() {
    let icon = load_icon(&bundled_icon()).expect("bundled icon should decode");

    assert!(icon.width() > 0);
    assert!(icon.height() > 0);
    assert_eq!(
        icon.rgba().len(),
        (icon.width() * icon.height() * 4) as usize
    );
}

/// **VALUE**: Verifies a missing icon file is reported as `WindowError::Icon`.
///
/// **BUG THIS CATCHES**: Would catch an icon failure being treated as a window creation
/// failure, which would stop the window from opening over a cosmetic problem.
#[test]
fn given_missing_icon_when_loading_then_icon_error() {
    let result = load_icon(&PathBuf::from("assets/does-not-exist.png"));

    let err = result.expect_err("missing icon should fail");
    assert!(matches!(err, WindowError::Icon { .. }));
    assert!(err.to_string().contains("does-not-exist.png"));
}

#[test]
fn given_default_server_url_when_parsing_then_localhost_8501() {
    let url = parse_target_url(STREAMLIT_SERVER_URL).expect("default URL should parse");

    assert_eq!(url.host_str(), Some("localhost"));
    assert_eq!(url.port(), Some(8501));
}

#[test]
fn given_garbage_url_when_parsing_then_create_error() {
    let result = parse_target_url("not a url");

    assert!(matches!(result, Err(WindowError::Create { .. })));
}

/// **VALUE**: Verifies the exit latch lets exactly one quit decision skip re-requesting exit.
///
/// **WHY THIS MATTERS**: When the last window closes, Tauri is already exiting. Requesting
/// exit again from that handler fires a second `ExitRequested`.
///
/// **BUG THIS CATCHES**: Would catch a latch that never resets. A later explicit quit
/// (after a macOS stay-alive) would then be swallowed.
#[test]
fn given_exit_underway_when_taken_then_reported_once() {
    // GIVEN: Tauri reports the last window closed
    let latch = ExitLatch::default();
    latch.set();

    // WHEN / THEN: The quit path sees it once, then it is reset
    assert!(latch.take());
    assert!(!latch.take());
}

#[test]
fn given_stay_alive_when_latch_cleared_then_later_exit_is_requested() {
    let latch = ExitLatch::default();
    latch.set();

    latch.clear();

    assert!(!latch.take());
}
