//! One-shot color-scheme queries.

use crate::error::MediaQueryError;
use crate::media::{Host, MediaQueryService};
use crate::preference::{ThemePreference, DARK_QUERY, LIGHT_QUERY};

/// Reads the host's current color-scheme preference.
///
/// Computed fresh on every call. A host without a media-query capability
/// reports [`ThemePreference::NoPreference`]; that is not an error. Errors
/// come only from a capability that fails while evaluating.
///
/// # Example
///
/// ```rust
/// use std::rc::Rc;
/// use system_theme::{current_theme, ColorScheme, Host, MockMediaQueries, ThemePreference};
///
/// assert_eq!(current_theme(&Host::headless()).unwrap(), ThemePreference::NoPreference);
///
/// let mock = Rc::new(MockMediaQueries::new(Some(ColorScheme::Light)));
/// let host = Host::with_media_queries(mock);
/// assert_eq!(current_theme(&host).unwrap(), ThemePreference::Light);
/// ```
pub fn current_theme(host: &Host) -> Result<ThemePreference, MediaQueryError> {
    match host.media_queries() {
        Some(service) => classify(service.as_ref()),
        None => Ok(ThemePreference::NoPreference),
    }
}

/// Categorizes what `service` reports right now.
///
/// The dark query is checked first, then the light query. When a service
/// matches both, dark wins.
pub fn classify(service: &dyn MediaQueryService) -> Result<ThemePreference, MediaQueryError> {
    if service.matches(DARK_QUERY)? {
        return Ok(ThemePreference::Dark);
    }
    if service.matches(LIGHT_QUERY)? {
        return Ok(ThemePreference::Light);
    }
    Ok(ThemePreference::NoPreference)
}
