use super::*;
use futures::executor::block_on;

#[test]
fn test_overlay_hidden_once_after_success() {
    let h = Harness::new();
    let dialog = block_on(Dialog::open_view_with_loading(&h.ctx, "Loaded".to_string())).unwrap();

    assert_eq!(dialog.borrow().message, "Loaded");
    assert_eq!(h.overlay.shows.get(), 1);
    assert_eq!(h.overlay.hides.get(), 1);
    assert!(!h.overlay.visible());
}

#[test]
fn test_overlay_hidden_once_after_failure() {
    let h = Harness::new();
    let result = block_on(Broken::open_view_with_loading(&h.ctx, ()));

    assert!(matches!(result, Err(FormError::Binding(_))));
    assert_eq!(h.overlay.shows.get(), 1);
    assert_eq!(h.overlay.hides.get(), 1);
    assert!(!h.overlay.visible());
}

#[test]
fn test_overlay_show_failure_skips_open() {
    let h = Harness::new();
    h.overlay.fail_show.set(true);
    let result = block_on(Hud::open_view_with_loading(&h.ctx, ()));

    assert!(matches!(result, Err(FormError::Overlay(_))));
    assert_eq!(h.overlay.hides.get(), 1);
    assert_eq!(hook_calls().loads.get(), 0);
    assert!(!h.manager.is_open("hud/Main"));
}

#[test]
fn test_open_error_wins_over_hide_error() {
    let h = Harness::new();
    h.overlay.fail_hide.set(true);
    let result = block_on(Broken::open_view_with_loading(&h.ctx, ()));

    assert!(matches!(result, Err(FormError::Binding(_))));
    assert_eq!(h.overlay.hides.get(), 1);
}

#[test]
fn test_hide_error_reported_after_successful_open() {
    let h = Harness::new();
    h.overlay.fail_hide.set(true);
    let result = block_on(Hud::open_view_with_loading(&h.ctx, ()));

    assert!(matches!(result, Err(FormError::Overlay(ref reason)) if reason == "hide refused"));
    assert!(h.manager.is_open("hud/Main"));
    assert_eq!(h.overlay.hides.get(), 1);
}
