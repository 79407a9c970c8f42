//! # System Theme - Live OS Color-Scheme Preference
//!
//! `system-theme` tells a UI layer whether the user's operating system prefers
//! a light or dark color scheme, and keeps that answer current while the
//! preference changes.
//!
//! ## Core Concepts
//!
//! - [`ThemePreference`]: `Light`, `Dark`, or `NoPreference`, surfaced as
//!   `"light"`, `"dark"`, or nothing
//! - [`current_theme`]: one-shot synchronous query
//! - [`use_system_theme`]: mounts a [`SystemTheme`] handle that follows the OS
//!   until it is dropped
//! - [`Host`] and [`MediaQueryService`]: the injected environment. Nothing in
//!   this crate reads global state.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::rc::Rc;
//! use system_theme::{current_theme, use_system_theme, ColorScheme, Host, MockMediaQueries};
//!
//! let mock = Rc::new(MockMediaQueries::new(None));
//! let host = Host::with_media_queries(mock.clone());
//!
//! assert_eq!(current_theme(&host).unwrap().as_str(), None);
//!
//! let theme = use_system_theme(&host, None).unwrap();
//! mock.trigger_change(Some(ColorScheme::Dark));
//! assert_eq!(theme.as_str(), Some("dark"));
//! mock.trigger_change(Some(ColorScheme::Light));
//! assert_eq!(theme.as_str(), Some("light"));
//! ```
//!
//! ## Hosts Without Media Queries
//!
//! A headless process, or a window system with no query API, is a normal
//! environment rather than a failure. [`current_theme`] reports
//! `NoPreference` and [`use_system_theme`] falls back to the caller's initial
//! value:
//!
//! ```rust
//! use system_theme::{use_system_theme, Host, ThemePreference};
//!
//! let theme = use_system_theme(&Host::headless(), Some(ThemePreference::Dark)).unwrap();
//! assert_eq!(theme.get(), ThemePreference::Dark);
//! ```
//!
//! ## Features
//!
//! - **`system`** (default) - [`SystemMediaQueries`] and [`Host::system`],
//!   backed by the `dark-light` crate

mod detect;
mod error;
mod hook;
pub mod media;
pub mod mock;
mod preference;
#[cfg(feature = "system")]
pub mod system;

pub use detect::{classify, current_theme};
pub use error::{MediaQueryError, ParsePreferenceError};
pub use hook::{use_system_theme, MonitorState, SystemTheme, WatchId};
pub use media::{ChangeCallback, Host, MediaQueryService, Subscription};
pub use mock::MockMediaQueries;
pub use preference::{ColorScheme, ThemePreference, DARK_QUERY, LIGHT_QUERY};

#[cfg(feature = "system")]
pub use system::{SchemeDetector, SystemMediaQueries};
