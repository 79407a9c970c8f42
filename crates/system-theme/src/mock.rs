//! In-memory [`MediaQueryService`] for tests and non-interactive hosts.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::error::MediaQueryError;
use crate::media::{ChangeCallback, MediaQueryService, Subscription};
use crate::preference::ColorScheme;

struct Listener {
    id: u64,
    query: String,
    callback: Rc<RefCell<ChangeCallback>>,
}

#[derive(Default)]
struct MockState {
    scheme: Option<ColorScheme>,
    failure: Option<String>,
    subscribe_failure: Option<String>,
    listeners: Vec<Listener>,
    next_id: u64,
    subscribe_count: usize,
    unsubscribe_count: usize,
    double_releases: usize,
}

/// Mock media-query service with a settable color scheme.
///
/// The scheme is `Some(Light)`, `Some(Dark)`, or `None` for "no preference".
/// [`set_scheme`](Self::set_scheme) changes what queries report without
/// notifying anyone; [`trigger_change`](Self::trigger_change) changes it and
/// fires every registered listener, the way a host delivers a change event.
///
/// # Example
///
/// ```rust
/// use std::rc::Rc;
/// use system_theme::{use_system_theme, ColorScheme, Host, MockMediaQueries, ThemePreference};
///
/// let mock = Rc::new(MockMediaQueries::new(None));
/// let host = Host::with_media_queries(mock.clone());
///
/// let theme = use_system_theme(&host, None).unwrap();
/// assert_eq!(theme.get(), ThemePreference::NoPreference);
///
/// mock.trigger_change(Some(ColorScheme::Dark));
/// assert_eq!(theme.get(), ThemePreference::Dark);
///
/// drop(theme);
/// assert_eq!(mock.unsubscribe_count(), 1);
/// ```
#[derive(Default)]
pub struct MockMediaQueries {
    state: RefCell<MockState>,
}

impl MockMediaQueries {
    /// Create a mock reporting `scheme`.
    pub fn new(scheme: Option<ColorScheme>) -> Self {
        Self {
            state: RefCell::new(MockState {
                scheme,
                ..MockState::default()
            }),
        }
    }

    /// Create a mock whose query evaluation always fails with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        let mock = Self::new(None);
        mock.set_failure(Some(reason.into()));
        mock
    }

    /// Make evaluation fail (`Some`) or succeed again (`None`).
    pub fn set_failure(&self, reason: Option<String>) {
        self.state.borrow_mut().failure = reason;
    }

    /// Make `subscribe` fail (`Some`) or succeed again (`None`).
    pub fn set_subscribe_failure(&self, reason: Option<String>) {
        self.state.borrow_mut().subscribe_failure = reason;
    }

    /// Change the reported scheme without notifying listeners.
    pub fn set_scheme(&self, scheme: Option<ColorScheme>) {
        self.state.borrow_mut().scheme = scheme;
    }

    pub fn scheme(&self) -> Option<ColorScheme> {
        self.state.borrow().scheme
    }

    /// Change the reported scheme and notify every listener.
    ///
    /// Listeners fire even when their query's result did not change, which
    /// lets tests exercise redundant notifications.
    pub fn trigger_change(&self, scheme: Option<ColorScheme>) {
        let pending: Vec<(u64, String, Rc<RefCell<ChangeCallback>>)> = {
            let mut state = self.state.borrow_mut();
            state.scheme = scheme;
            state
                .listeners
                .iter()
                .map(|l| (l.id, l.query.clone(), Rc::clone(&l.callback)))
                .collect()
        };

        for (id, query, callback) in pending {
            // An earlier callback may have released this registration.
            if !self.is_registered(id) {
                continue;
            }
            let matches = query_matches(scheme, &query);
            let Ok(mut on_change) = callback.try_borrow_mut() else {
                tracing::trace!(id, "skipping nested notification");
                continue;
            };
            (*on_change)(matches);
        }
    }

    /// Number of registrations not yet released.
    pub fn active_subscriptions(&self) -> usize {
        self.state.borrow().listeners.len()
    }

    /// Total successful `subscribe` calls.
    pub fn subscribe_count(&self) -> usize {
        self.state.borrow().subscribe_count
    }

    /// Total `unsubscribe` calls that released a live registration.
    pub fn unsubscribe_count(&self) -> usize {
        self.state.borrow().unsubscribe_count
    }

    /// `unsubscribe` calls for a registration that was not live.
    pub fn double_releases(&self) -> usize {
        self.state.borrow().double_releases
    }

    fn is_registered(&self, id: u64) -> bool {
        self.state.borrow().listeners.iter().any(|l| l.id == id)
    }
}

fn query_matches(scheme: Option<ColorScheme>, query: &str) -> bool {
    match (scheme, ColorScheme::from_query(query)) {
        (Some(current), Some(asked)) => current == asked,
        _ => false,
    }
}

impl MediaQueryService for MockMediaQueries {
    fn matches(&self, query: &str) -> Result<bool, MediaQueryError> {
        let state = self.state.borrow();
        if let Some(reason) = &state.failure {
            return Err(MediaQueryError::evaluation(query, reason.as_str()));
        }
        Ok(query_matches(state.scheme, query))
    }

    fn subscribe(
        &self,
        query: &str,
        on_change: ChangeCallback,
    ) -> Result<Subscription, MediaQueryError> {
        let mut state = self.state.borrow_mut();
        if let Some(reason) = &state.subscribe_failure {
            return Err(MediaQueryError::subscribe(query, reason.as_str()));
        }
        state.next_id += 1;
        let id = state.next_id;
        state.listeners.push(Listener {
            id,
            query: query.to_string(),
            callback: Rc::new(RefCell::new(on_change)),
        });
        state.subscribe_count += 1;
        Ok(Subscription::new(id, query))
    }

    fn unsubscribe(&self, subscription: Subscription) {
        let mut state = self.state.borrow_mut();
        let before = state.listeners.len();
        state.listeners.retain(|l| l.id != subscription.id());
        if state.listeners.len() < before {
            state.unsubscribe_count += 1;
        } else {
            state.double_releases += 1;
            tracing::warn!(
                id = subscription.id(),
                query = subscription.query(),
                "released a subscription that was not active"
            );
        }
    }
}

impl fmt::Debug for MockMediaQueries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("MockMediaQueries")
            .field("scheme", &state.scheme)
            .field("failure", &state.failure)
            .field("subscribe_failure", &state.subscribe_failure)
            .field("listeners", &state.listeners.len())
            .finish()
    }
}
