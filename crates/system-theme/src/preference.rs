//! The color-scheme preference value and the media queries that produce it.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::error::ParsePreferenceError;

/// Media query that matches when the OS prefers a dark color scheme.
pub const DARK_QUERY: &str = "(prefers-color-scheme: dark)";

/// Media query that matches when the OS prefers a light color scheme.
pub const LIGHT_QUERY: &str = "(prefers-color-scheme: light)";

/// A concrete color scheme the OS can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorScheme {
    /// Light background, dark text.
    Light,
    /// Dark background, light text.
    Dark,
}

impl ColorScheme {
    /// Returns the `prefers-color-scheme` media query for this scheme.
    pub fn query(self) -> &'static str {
        match self {
            ColorScheme::Light => LIGHT_QUERY,
            ColorScheme::Dark => DARK_QUERY,
        }
    }

    /// Returns the scheme a recognized query string asks about.
    pub fn from_query(query: &str) -> Option<Self> {
        match query {
            DARK_QUERY => Some(ColorScheme::Dark),
            LIGHT_QUERY => Some(ColorScheme::Light),
            _ => None,
        }
    }
}

/// The user's color-scheme preference as reported by the host.
///
/// Consumers see it as `"light"`, `"dark"`, or nothing at all: [`as_str`]
/// returns an `Option<&str>` and the serde representation is a string or
/// `null`.
///
/// ```rust
/// use system_theme::ThemePreference;
///
/// assert_eq!(ThemePreference::Dark.as_str(), Some("dark"));
/// assert_eq!(ThemePreference::NoPreference.as_str(), None);
/// assert_eq!("light".parse::<ThemePreference>().unwrap(), ThemePreference::Light);
/// ```
///
/// [`as_str`]: ThemePreference::as_str
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ThemePreference {
    Light,
    Dark,
    /// The host reports neither scheme, or cannot report at all.
    #[default]
    NoPreference,
}

impl ThemePreference {
    /// Returns the external string form, or `None` for no preference.
    pub fn as_str(self) -> Option<&'static str> {
        match self {
            ThemePreference::Light => Some("light"),
            ThemePreference::Dark => Some("dark"),
            ThemePreference::NoPreference => None,
        }
    }

    /// Returns the concrete scheme, if any.
    pub fn scheme(self) -> Option<ColorScheme> {
        match self {
            ThemePreference::Light => Some(ColorScheme::Light),
            ThemePreference::Dark => Some(ColorScheme::Dark),
            ThemePreference::NoPreference => None,
        }
    }

    pub fn is_dark(self) -> bool {
        self == ThemePreference::Dark
    }

    pub fn is_light(self) -> bool {
        self == ThemePreference::Light
    }

    /// True for `Light` and `Dark`.
    pub fn is_set(self) -> bool {
        self != ThemePreference::NoPreference
    }
}

impl From<ColorScheme> for ThemePreference {
    fn from(scheme: ColorScheme) -> Self {
        match scheme {
            ColorScheme::Light => ThemePreference::Light,
            ColorScheme::Dark => ThemePreference::Dark,
        }
    }
}

impl From<Option<ColorScheme>> for ThemePreference {
    fn from(scheme: Option<ColorScheme>) -> Self {
        scheme.map_or(ThemePreference::NoPreference, ThemePreference::from)
    }
}

impl fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str().unwrap_or("no-preference"))
    }
}

impl FromStr for ThemePreference {
    type Err = ParsePreferenceError;

    /// Parses the CSS keywords `light`, `dark` and `no-preference`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(ThemePreference::Light),
            "dark" => Ok(ThemePreference::Dark),
            "no-preference" => Ok(ThemePreference::NoPreference),
            _ => Err(ParsePreferenceError(s.to_string())),
        }
    }
}

impl Serialize for ThemePreference {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.as_str() {
            Some(name) => serializer.serialize_str(name),
            None => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for ThemePreference {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Option::<String>::deserialize(deserializer)?.as_deref() {
            None => Ok(ThemePreference::NoPreference),
            Some("light") => Ok(ThemePreference::Light),
            Some("dark") => Ok(ThemePreference::Dark),
            Some(other) => Err(de::Error::unknown_variant(other, &["light", "dark"])),
        }
    }
}
