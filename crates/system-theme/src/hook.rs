//! The live color-scheme hook.
//!
//! [`use_system_theme`] mounts a [`SystemTheme`] handle. While the handle is
//! alive it holds exactly one subscription on the host's dark-scheme query and
//! keeps its value current. Dropping the handle (or calling
//! [`SystemTheme::unmount`]) releases the subscription.
//!
//! ```text
//!            host has media queries?
//!   mount ──┬── no  ──▶ Static  (value = initial or NoPreference)
//!           └── yes ──▶ Live    (value = classify(), subscribed)
//!                         │ change notification ──▶ classify() ──▶ update if different
//!   drop / unmount ──▶ Unmounted (subscription released once)
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::detect::classify;
use crate::error::MediaQueryError;
use crate::media::{ChangeCallback, Host, MediaQueryService, Subscription};
use crate::preference::{ThemePreference, DARK_QUERY};

/// Identifies a listener registered with [`SystemTheme::watch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchId(u64);

type Watcher = Rc<RefCell<Box<dyn FnMut(ThemePreference)>>>;

/// Lifecycle stage of a [`SystemTheme`] handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    /// No media-query capability; the value never changes.
    Static,
    /// Subscribed; the value follows the host.
    Live,
    /// Released. Only observable after a failed [`SystemTheme::remount`].
    Unmounted,
}

/// Value shared between a handle and its change callback.
struct ThemeCell {
    value: Cell<ThemePreference>,
    watchers: RefCell<Vec<(WatchId, Watcher)>>,
    next_watch: Cell<u64>,
}

impl ThemeCell {
    fn new() -> Self {
        Self {
            value: Cell::new(ThemePreference::NoPreference),
            watchers: RefCell::new(Vec::new()),
            next_watch: Cell::new(0),
        }
    }

    /// Stores `next` and notifies watchers if the category changed.
    fn apply(&self, next: ThemePreference) -> bool {
        let previous = self.value.replace(next);
        if previous == next {
            tracing::trace!(value = %next, "color scheme unchanged");
            return false;
        }
        tracing::debug!(%previous, %next, "color scheme changed");

        // Clone out so a watcher may add or remove watchers.
        let watchers: Vec<Watcher> = self
            .watchers
            .borrow()
            .iter()
            .map(|(_, w)| Rc::clone(w))
            .collect();
        for watcher in watchers {
            // A watcher that triggers another change while it runs is not
            // called again for the nested change.
            let Ok(mut notify) = watcher.try_borrow_mut() else {
                tracing::trace!(value = %next, "skipping re-entrant watcher");
                continue;
            };
            (*notify)(next);
        }
        true
    }
}

enum Binding {
    Static,
    Live {
        service: Rc<dyn MediaQueryService>,
        subscription: Subscription,
    },
    Unmounted,
}

/// A mounted system-theme hook.
///
/// Obtain one with [`use_system_theme`]. The handle is the owner of its
/// subscription: at most one is active at any time, and it is handed back to
/// the service exactly once, whichever way the handle goes away.
///
/// # Example
///
/// ```rust
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use system_theme::{use_system_theme, ColorScheme, Host, MockMediaQueries, ThemePreference};
///
/// let mock = Rc::new(MockMediaQueries::new(Some(ColorScheme::Light)));
/// let host = Host::with_media_queries(mock.clone());
/// let theme = use_system_theme(&host, None).unwrap();
///
/// let renders = Rc::new(RefCell::new(Vec::new()));
/// let log = Rc::clone(&renders);
/// theme.watch(move |value| log.borrow_mut().push(value));
///
/// mock.trigger_change(Some(ColorScheme::Dark));
/// assert_eq!(theme.as_str(), Some("dark"));
/// assert_eq!(*renders.borrow(), vec![ThemePreference::Dark]);
/// ```
pub struct SystemTheme {
    host: Host,
    initial: Option<ThemePreference>,
    cell: Rc<ThemeCell>,
    binding: Binding,
}

/// Mounts a [`SystemTheme`] on `host`.
///
/// `initial` is used only when the host has no media-query capability; it is
/// ignored otherwise, even if the host reports something else. An error means
/// the capability itself failed, and no subscription is left behind.
pub fn use_system_theme(
    host: &Host,
    initial: Option<ThemePreference>,
) -> Result<SystemTheme, MediaQueryError> {
    SystemTheme::mount(host.clone(), initial)
}

impl SystemTheme {
    /// Mounts a handle. Same as [`use_system_theme`], taking the host by value.
    pub fn mount(host: Host, initial: Option<ThemePreference>) -> Result<Self, MediaQueryError> {
        let cell = Rc::new(ThemeCell::new());
        let binding = activate(&host, initial, &cell)?;
        Ok(Self {
            host,
            initial,
            cell,
            binding,
        })
    }

    /// The current preference.
    pub fn get(&self) -> ThemePreference {
        self.cell.value.get()
    }

    /// `Some("light")`, `Some("dark")`, or `None`.
    pub fn as_str(&self) -> Option<&'static str> {
        self.get().as_str()
    }

    pub fn state(&self) -> MonitorState {
        match self.binding {
            Binding::Static => MonitorState::Static,
            Binding::Live { .. } => MonitorState::Live,
            Binding::Unmounted => MonitorState::Unmounted,
        }
    }

    pub fn is_live(&self) -> bool {
        self.state() == MonitorState::Live
    }

    /// Registers `listener` to run after each change of the value.
    ///
    /// Listeners are not called for redundant notifications, nor for the
    /// initial value. They are dropped together with the handle. A listener
    /// that causes a further change while it runs is not re-entered; it
    /// can read the newest value through [`get`](Self::get).
    pub fn watch<F>(&self, listener: F) -> WatchId
    where
        F: FnMut(ThemePreference) + 'static,
    {
        let id = WatchId(self.cell.next_watch.get());
        self.cell.next_watch.set(id.0 + 1);
        let listener: Box<dyn FnMut(ThemePreference)> = Box::new(listener);
        self.cell
            .watchers
            .borrow_mut()
            .push((id, Rc::new(RefCell::new(listener))));
        id
    }

    /// Removes a listener. Returns `false` if it was not registered.
    pub fn unwatch(&self, id: WatchId) -> bool {
        let mut watchers = self.cell.watchers.borrow_mut();
        let before = watchers.len();
        watchers.retain(|(w, _)| *w != id);
        watchers.len() < before
    }

    /// Releases the current subscription and runs initialization again.
    ///
    /// On error the handle stays [`MonitorState::Unmounted`] and keeps its
    /// last value.
    pub fn remount(&mut self) -> Result<(), MediaQueryError> {
        self.release();
        self.binding = activate(&self.host, self.initial, &self.cell)?;
        Ok(())
    }

    /// Switches to a new host and initial value, then remounts.
    pub fn remount_with(
        &mut self,
        host: Host,
        initial: Option<ThemePreference>,
    ) -> Result<(), MediaQueryError> {
        self.release();
        self.host = host;
        self.initial = initial;
        self.binding = activate(&self.host, self.initial, &self.cell)?;
        Ok(())
    }

    /// Tears the handle down. Equivalent to dropping it.
    pub fn unmount(mut self) {
        self.release();
    }

    fn release(&mut self) {
        match std::mem::replace(&mut self.binding, Binding::Unmounted) {
            Binding::Live {
                service,
                subscription,
            } => {
                tracing::debug!(id = subscription.id(), "releasing color scheme subscription");
                service.unsubscribe(subscription);
            }
            Binding::Static | Binding::Unmounted => {}
        }
    }
}

impl Drop for SystemTheme {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for SystemTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemTheme")
            .field("value", &self.get())
            .field("state", &self.state())
            .field("host", &self.host)
            .finish()
    }
}

fn activate(
    host: &Host,
    initial: Option<ThemePreference>,
    cell: &Rc<ThemeCell>,
) -> Result<Binding, MediaQueryError> {
    let Some(service) = host.media_queries() else {
        let value = initial.unwrap_or_default();
        cell.apply(value);
        tracing::debug!(%value, "no media query capability, using static color scheme");
        return Ok(Binding::Static);
    };

    // Nothing is applied until both steps succeed, so a failed remount
    // leaves the value and watchers untouched.
    let value = classify(service.as_ref())?;
    let subscription = service.subscribe(
        DARK_QUERY,
        change_handler(Rc::downgrade(service), Rc::downgrade(cell)),
    )?;
    cell.apply(value);
    tracing::debug!(%value, id = subscription.id(), "tracking system color scheme");
    Ok(Binding::Live {
        service: Rc::clone(service),
        subscription,
    })
}

/// Builds the subscription callback.
///
/// Holds only weak references: the service owns the callback, and the handle
/// owns the service.
fn change_handler(service: Weak<dyn MediaQueryService>, cell: Weak<ThemeCell>) -> ChangeCallback {
    Box::new(move |_matches| {
        let (Some(service), Some(cell)) = (service.upgrade(), cell.upgrade()) else {
            return;
        };
        match classify(service.as_ref()) {
            Ok(next) => {
                cell.apply(next);
            }
            Err(err) => {
                tracing::warn!(%err, "keeping previous color scheme after failed recompute");
            }
        }
    })
}
