//! Integration tests for the system theme hook.
//!
//! These drive the public API through `MockMediaQueries`, so they behave the
//! same on a desktop, in CI, and on a headless server.

use std::cell::RefCell;
use std::rc::Rc;

use system_theme::{
    current_theme, use_system_theme, ColorScheme, Host, MediaQueryError, MockMediaQueries,
    MonitorState, ThemePreference,
};

fn mock_host(scheme: Option<ColorScheme>) -> (Rc<MockMediaQueries>, Host) {
    let mock = Rc::new(MockMediaQueries::new(scheme));
    let host = Host::with_media_queries(mock.clone());
    (mock, host)
}

// ============================================================================
// Hosts without media queries
// ============================================================================

#[test]
fn no_media_queries_reports_nothing() {
    let theme = use_system_theme(&Host::window(None), None).unwrap();
    assert_eq!(theme.as_str(), None);
}

#[test]
fn headless_reports_nothing() {
    let theme = use_system_theme(&Host::headless(), None).unwrap();
    assert_eq!(theme.as_str(), None);
    assert_eq!(current_theme(&Host::headless()).unwrap().as_str(), None);
}

#[test]
fn headless_uses_initial_value() {
    let theme = use_system_theme(&Host::headless(), Some(ThemePreference::Light)).unwrap();
    assert_eq!(theme.as_str(), Some("light"));
    assert_eq!(theme.state(), MonitorState::Static);
}

#[test]
fn no_media_queries_uses_initial_value() {
    let theme = use_system_theme(&Host::window(None), Some(ThemePreference::Dark)).unwrap();
    assert_eq!(theme.as_str(), Some("dark"));
}

// ============================================================================
// Live hosts
// ============================================================================

#[test]
fn initializes_with_current_system_theme() {
    let (_mock, host) = mock_host(Some(ColorScheme::Light));
    let theme = use_system_theme(&host, None).unwrap();
    assert_eq!(theme.as_str(), Some("light"));

    let (_mock, host) = mock_host(Some(ColorScheme::Dark));
    let second = use_system_theme(&host, None).unwrap();
    assert_eq!(second.as_str(), Some("dark"));
}

#[test]
fn live_value_matches_current_theme_at_mount() {
    for scheme in [None, Some(ColorScheme::Light), Some(ColorScheme::Dark)] {
        let (_mock, host) = mock_host(scheme);
        let expected = current_theme(&host).unwrap();
        let theme = use_system_theme(&host, None).unwrap();
        assert_eq!(theme.get(), expected);
    }
}

#[test]
fn follows_system_theme_changes() {
    let (mock, host) = mock_host(None);
    let theme = use_system_theme(&host, None).unwrap();
    assert_eq!(theme.as_str(), None);

    mock.trigger_change(Some(ColorScheme::Dark));
    assert_eq!(theme.as_str(), Some("dark"));

    mock.trigger_change(Some(ColorScheme::Light));
    assert_eq!(theme.as_str(), Some("light"));
}

#[test]
fn current_theme_for_each_scheme() {
    let (mock, host) = mock_host(None);
    assert_eq!(current_theme(&host).unwrap().as_str(), None);

    mock.set_scheme(Some(ColorScheme::Dark));
    assert_eq!(current_theme(&host).unwrap().as_str(), Some("dark"));

    mock.set_scheme(Some(ColorScheme::Light));
    assert_eq!(current_theme(&host).unwrap().as_str(), Some("light"));
}

#[test]
fn watchers_see_each_change_once() {
    let (mock, host) = mock_host(None);
    let theme = use_system_theme(&host, None).unwrap();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&seen);
    theme.watch(move |value| log.borrow_mut().push(value.as_str()));

    mock.trigger_change(Some(ColorScheme::Dark));
    mock.trigger_change(Some(ColorScheme::Dark));
    mock.trigger_change(None);
    mock.trigger_change(Some(ColorScheme::Light));

    assert_eq!(*seen.borrow(), vec![Some("dark"), None, Some("light")]);
}

// ============================================================================
// Teardown
// ============================================================================

#[test]
fn drop_releases_subscription_once() {
    let (mock, host) = mock_host(Some(ColorScheme::Dark));
    let theme = use_system_theme(&host, None).unwrap();
    assert_eq!(mock.active_subscriptions(), 1);

    drop(theme);
    assert_eq!(mock.active_subscriptions(), 0);
    assert_eq!(mock.unsubscribe_count(), 1);
    assert_eq!(mock.double_releases(), 0);
}

#[test]
fn unmount_stops_updates() {
    let (mock, host) = mock_host(None);
    let theme = use_system_theme(&host, None).unwrap();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&seen);
    theme.watch(move |value| log.borrow_mut().push(value));

    theme.unmount();
    mock.trigger_change(Some(ColorScheme::Dark));

    assert!(seen.borrow().is_empty());
    assert_eq!(mock.unsubscribe_count(), 1);
}

#[test]
fn static_handle_never_subscribes() {
    let mock = Rc::new(MockMediaQueries::new(Some(ColorScheme::Dark)));
    let theme = use_system_theme(&Host::headless(), None).unwrap();
    drop(theme);
    assert_eq!(mock.subscribe_count(), 0);
    assert_eq!(mock.unsubscribe_count(), 0);
}

#[test]
fn instances_are_isolated() {
    let (mock, host) = mock_host(Some(ColorScheme::Light));
    let first = use_system_theme(&host, None).unwrap();
    let second = use_system_theme(&host, None).unwrap();
    assert_eq!(mock.active_subscriptions(), 2);

    drop(first);
    mock.trigger_change(Some(ColorScheme::Dark));
    assert_eq!(second.get(), ThemePreference::Dark);
    assert_eq!(mock.active_subscriptions(), 1);

    drop(second);
    assert_eq!(mock.unsubscribe_count(), 2);
    assert_eq!(mock.double_releases(), 0);
}

#[test]
fn watcher_may_unmount_its_own_handle() {
    let (mock, host) = mock_host(None);
    let slot = Rc::new(RefCell::new(Some(use_system_theme(&host, None).unwrap())));
    let inner = Rc::clone(&slot);
    if let Some(theme) = slot.borrow().as_ref() {
        theme.watch(move |_| {
            if let Ok(mut guard) = inner.try_borrow_mut() {
                guard.take();
            }
        });
    }

    mock.trigger_change(Some(ColorScheme::Dark));
    assert!(slot.borrow().is_none());
    assert_eq!(mock.active_subscriptions(), 0);
    assert_eq!(mock.double_releases(), 0);
}

// ============================================================================
// Misbehaving capability
// ============================================================================

#[test]
fn capability_failure_reaches_caller() {
    let mock = Rc::new(MockMediaQueries::failing("query engine crashed"));
    let host = Host::with_media_queries(mock.clone());

    assert!(matches!(
        current_theme(&host),
        Err(MediaQueryError::Evaluation { .. })
    ));
    assert!(use_system_theme(&host, Some(ThemePreference::Light)).is_err());
    assert_eq!(mock.active_subscriptions(), 0);
}

#[test]
fn refused_subscription_reaches_caller() {
    let (mock, host) = mock_host(Some(ColorScheme::Dark));
    mock.set_subscribe_failure(Some("too many listeners".into()));

    let err = use_system_theme(&host, None).unwrap_err();
    assert!(matches!(err, MediaQueryError::Subscribe { .. }));
    assert_eq!(mock.active_subscriptions(), 0);

    // Evaluation still works, so the one-shot query is unaffected.
    assert_eq!(current_theme(&host).unwrap(), ThemePreference::Dark);
}
