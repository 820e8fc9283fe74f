//! Action links.
//!
//! An action link is a URI that belongs to an OS-level application (phone dialer, messages,
//! mail client) rather than to the web view. The navigation engine hands them to the
//! [`ExternalLauncher`](crate::browser::ExternalLauncher) instead of rendering them.

/// Phone dialer scheme.
pub const PHONE_DIALER: &str = "tel:";
/// Messages scheme.
pub const MESSAGES: &str = "sms:";
/// Send an email scheme.
pub const EMAIL: &str = "mailto:";

/// All schemes that classify a URI as an action link.
pub const ACTION_SCHEMES: [&str; 3] = [PHONE_DIALER, MESSAGES, EMAIL];

/// Returns `true` when `absolute_uri` contains any of the [`ACTION_SCHEMES`].
///
/// This is a substring match, not a scheme-prefix match: a regular page whose query string
/// embeds `mailto:` is classified as an action link as well. Matching is ordinal (case
/// sensitive).
pub fn is_action_link(absolute_uri: &str) -> bool {
    ACTION_SCHEMES
        .iter()
        .any(|scheme| absolute_uri.contains(scheme))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_schemes_are_detected() {
        assert!(is_action_link("tel:+15551234567"));
        assert!(is_action_link("sms:+1555"));
        assert!(is_action_link("mailto:a@b.com"));
    }

    #[test]
    fn regular_uris_are_not_actions() {
        assert!(!is_action_link("https://example.com"));
        assert!(!is_action_link("about:blank"));
        assert!(!is_action_link(""));
    }

    #[test]
    fn substring_match_is_permissive() {
        // Embedded schemes count too, even though this is a plain https page.
        assert!(is_action_link("https://example.com/share?to=mailto:a@b.com"));
    }

    #[test]
    fn matching_is_case_sensitive() {
        assert!(!is_action_link("TEL:+15551234567"));
    }
}
