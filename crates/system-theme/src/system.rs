//! OS-backed media queries using the `dark-light` crate.

use std::cell::RefCell;
use std::rc::Rc;

use dark_light::{detect as detect_os_theme, Mode as OsThemeMode};

use crate::error::MediaQueryError;
use crate::media::{ChangeCallback, MediaQueryService, Subscription};
use crate::preference::{ColorScheme, ThemePreference};

/// Function used to read the OS color scheme. `Ok(None)` means the OS
/// reports no preference.
pub type SchemeDetector = fn() -> Result<Option<ColorScheme>, MediaQueryError>;

struct Listener {
    id: u64,
    query: String,
    /// Scheme this listener was last told about.
    seen: Option<ColorScheme>,
    callback: Rc<RefCell<ChangeCallback>>,
}

struct SystemState {
    listeners: Vec<Listener>,
    next_id: u64,
}

/// Media queries answered by the operating system.
///
/// Queries are evaluated by asking the OS each time. The OS crate offers no
/// change stream, so the application forwards its own "theme changed" event
/// (a window-system notification, a settings portal signal) by calling
/// [`refresh`](Self::refresh). Each subscriber remembers the scheme it last
/// heard about and is notified whenever the OS scheme differs from it,
/// including when its own query result did not flip, so a `no-preference` to
/// `light` move still reaches a listener on the dark query.
///
/// ```rust,no_run
/// use std::rc::Rc;
/// use system_theme::{use_system_theme, Host, SystemMediaQueries};
///
/// let system = Rc::new(SystemMediaQueries::new());
/// let host = Host::with_media_queries(system.clone());
/// let theme = use_system_theme(&host, None).unwrap();
///
/// // Later, from the window-system event handler:
/// system.refresh().unwrap();
/// println!("theme is now {}", theme.get());
/// ```
pub struct SystemMediaQueries {
    detector: SchemeDetector,
    state: RefCell<SystemState>,
}

impl SystemMediaQueries {
    /// Create a service that queries the OS.
    pub fn new() -> Self {
        Self::with_detector(os_scheme_detector)
    }

    /// Create a service with a custom detector.
    ///
    /// Useful for testing or for platforms the OS crate does not cover.
    pub fn with_detector(detector: SchemeDetector) -> Self {
        Self {
            detector,
            state: RefCell::new(SystemState {
                listeners: Vec::new(),
                next_id: 0,
            }),
        }
    }

    /// Create a service only if the OS can answer right now.
    ///
    /// Returns `None` where detection fails, e.g. without a desktop session.
    pub fn probe() -> Option<Self> {
        Self::probe_with(os_scheme_detector)
    }

    /// [`probe`](Self::probe) with a custom detector.
    pub fn probe_with(detector: SchemeDetector) -> Option<Self> {
        match detector() {
            Ok(_) => Some(Self::with_detector(detector)),
            Err(err) => {
                tracing::debug!(%err, "OS color scheme detection unavailable");
                None
            }
        }
    }

    /// Re-read the OS scheme and notify subscribers that have not seen it.
    ///
    /// A subscriber whose callback is still running (a nested `refresh` from
    /// inside a notification) is skipped and keeps its old baseline, so the
    /// next `refresh` delivers the change.
    pub fn refresh(&self) -> Result<ThemePreference, MediaQueryError> {
        let current = (self.detector)()?;
        let pending: Vec<_> = self
            .state
            .borrow()
            .listeners
            .iter()
            .filter(|l| l.seen != current)
            .map(|l| {
                let matches = scheme_matches(current, &l.query);
                (l.id, l.seen, matches, Rc::clone(&l.callback))
            })
            .collect();
        if !pending.is_empty() {
            tracing::debug!(?current, listeners = pending.len(), "OS color scheme changed");
        }

        for (id, seen, matches, callback) in pending {
            // An earlier callback may have released this registration.
            if !self.set_seen(id, current) {
                continue;
            }
            let Ok(mut on_change) = callback.try_borrow_mut() else {
                tracing::trace!(id, "skipping nested notification");
                self.set_seen(id, seen);
                continue;
            };
            (*on_change)(matches);
        }
        Ok(current.into())
    }

    /// Records the baseline of listener `id`. False if it is no longer registered.
    fn set_seen(&self, id: u64, scheme: Option<ColorScheme>) -> bool {
        let mut state = self.state.borrow_mut();
        match state.listeners.iter_mut().find(|l| l.id == id) {
            Some(listener) => {
                listener.seen = scheme;
                true
            }
            None => false,
        }
    }
}

impl Default for SystemMediaQueries {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaQueryService for SystemMediaQueries {
    fn matches(&self, query: &str) -> Result<bool, MediaQueryError> {
        let scheme = (self.detector)()?;
        Ok(scheme_matches(scheme, query))
    }

    fn subscribe(
        &self,
        query: &str,
        on_change: ChangeCallback,
    ) -> Result<Subscription, MediaQueryError> {
        // The baseline is the scheme at registration time, per listener.
        let seen = (self.detector)()?;
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let id = state.next_id;
        state.listeners.push(Listener {
            id,
            query: query.to_string(),
            seen,
            callback: Rc::new(RefCell::new(on_change)),
        });
        Ok(Subscription::new(id, query))
    }

    fn unsubscribe(&self, subscription: Subscription) {
        self.state
            .borrow_mut()
            .listeners
            .retain(|l| l.id != subscription.id());
    }
}

fn scheme_matches(scheme: Option<ColorScheme>, query: &str) -> bool {
    scheme.is_some() && scheme == ColorScheme::from_query(query)
}

fn os_scheme_detector() -> Result<Option<ColorScheme>, MediaQueryError> {
    match detect_os_theme() {
        Ok(OsThemeMode::Dark) => Ok(Some(ColorScheme::Dark)),
        Ok(OsThemeMode::Light) => Ok(Some(ColorScheme::Light)),
        Ok(OsThemeMode::Unspecified) => Ok(None),
        Err(err) => Err(MediaQueryError::Detection(err.to_string())),
    }
}
