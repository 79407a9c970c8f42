//! Host abstractions for media-query evaluation.
//!
//! The monitor never touches a windowing system directly. Everything it needs
//! is reached through a [`Host`], which may or may not carry a
//! [`MediaQueryService`]. Tests inject [`MockMediaQueries`](crate::MockMediaQueries);
//! desktop applications use [`SystemMediaQueries`](crate::SystemMediaQueries).

use std::fmt;
use std::rc::Rc;

use crate::error::MediaQueryError;

/// Listener invoked with the new `matches` value of the subscribed query.
pub type ChangeCallback = Box<dyn FnMut(bool)>;

/// A host capability that evaluates and watches media queries.
///
/// Implementations deliver change notifications from the host's own event
/// loop. A callback may call back into [`matches`](Self::matches) while it
/// runs, so implementations must not hold internal borrows across the call.
pub trait MediaQueryService {
    /// Evaluate a media query right now.
    fn matches(&self, query: &str) -> Result<bool, MediaQueryError>;

    /// Register `on_change` to run whenever `query` changes its result.
    fn subscribe(
        &self,
        query: &str,
        on_change: ChangeCallback,
    ) -> Result<Subscription, MediaQueryError>;

    /// Release a registration made by [`subscribe`](Self::subscribe).
    ///
    /// Taking the handle by value makes a second release of the same
    /// registration impossible from safe callers.
    fn unsubscribe(&self, subscription: Subscription);
}

/// An active registration with a [`MediaQueryService`].
///
/// Deliberately neither `Clone` nor `Copy`: the owner releases it exactly
/// once by handing it back to the service.
#[derive(Debug, PartialEq, Eq)]
pub struct Subscription {
    id: u64,
    query: String,
}

impl Subscription {
    /// Create a handle. Called by service implementations.
    pub fn new(id: u64, query: impl Into<String>) -> Self {
        Self {
            id,
            query: query.into(),
        }
    }

    /// Service-assigned identifier.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The query this registration watches.
    pub fn query(&self) -> &str {
        &self.query
    }
}

/// The environment the monitor runs in.
///
/// # Example
///
/// ```rust
/// use std::rc::Rc;
/// use system_theme::{Host, MockMediaQueries, ColorScheme};
///
/// // Server-side or CLI: nothing to query.
/// assert!(Host::headless().media_queries().is_none());
///
/// // A window whose platform offers no query API.
/// assert!(Host::window(None).media_queries().is_none());
///
/// let mock = Rc::new(MockMediaQueries::new(Some(ColorScheme::Dark)));
/// assert!(Host::with_media_queries(mock).media_queries().is_some());
/// ```
#[derive(Clone, Default)]
pub enum Host {
    /// No windowing system at all.
    #[default]
    Headless,
    /// A windowing system, possibly without a media-query capability.
    Window {
        media_queries: Option<Rc<dyn MediaQueryService>>,
    },
}

impl Host {
    pub fn headless() -> Self {
        Host::Headless
    }

    pub fn window(media_queries: Option<Rc<dyn MediaQueryService>>) -> Self {
        Host::Window { media_queries }
    }

    /// A window host backed by `service`.
    pub fn with_media_queries<S: MediaQueryService + 'static>(service: Rc<S>) -> Self {
        Host::Window {
            media_queries: Some(service),
        }
    }

    /// A host backed by the OS detector, or headless when detection is
    /// unavailable.
    ///
    /// The returned host owns the only handle to the service. Build the host
    /// with [`Host::with_media_queries`] instead when the application needs to
    /// call [`SystemMediaQueries::refresh`](crate::SystemMediaQueries::refresh).
    #[cfg(feature = "system")]
    pub fn system() -> Self {
        match crate::system::SystemMediaQueries::probe() {
            Some(service) => Host::with_media_queries(Rc::new(service)),
            None => Host::Headless,
        }
    }

    /// The media-query capability, when the host has one.
    pub fn media_queries(&self) -> Option<&Rc<dyn MediaQueryService>> {
        match self {
            Host::Headless => None,
            Host::Window { media_queries } => media_queries.as_ref(),
        }
    }
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Host::Headless => f.write_str("Headless"),
            Host::Window { media_queries } => f
                .debug_struct("Window")
                .field("media_queries", &media_queries.is_some())
                .finish(),
        }
    }
}
