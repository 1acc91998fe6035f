//! The closed table of schemes a [`Uri`](super::Uri) accepts.
//!
//! A scheme outside this table is rejected by [`Uri::with_scheme`](super::Uri::with_scheme).
//! Supporting a new protocol means adding a row here.

/// Supported schemes and their well-known default ports.
pub const SCHEMES: [(&str, u16); 9] = [
    ("http", 80),
    ("https", 443),
    ("ftp", 21),
    ("ssh", 22),
    ("sftp", 22),
    ("telnet", 23),
    ("smtp", 25),
    ("ldap", 389),
    ("rtsp", 554),
];

/// Returns the registered default port of `scheme`, compared case-insensitively.
#[inline]
pub fn default_port(scheme: &str) -> Option<u16> {
    SCHEMES.iter().find(|(name, _)| name.eq_ignore_ascii_case(scheme)).map(|(_, port)| *port)
}

/// Returns true if `scheme` is present in [`SCHEMES`].
#[inline]
pub fn is_supported(scheme: &str) -> bool {
    default_port(scheme).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_default_ports() {
        assert_eq!(default_port("http"), Some(80));
        assert_eq!(default_port("HTTPS"), Some(443));
        assert_eq!(default_port("sftp"), Some(22));
        assert_eq!(default_port("gopher"), None);
        assert_eq!(default_port(""), None);
    }

    #[test]
    fn unknown_schemes_are_not_supported() {
        assert!(is_supported("ldap"));
        assert!(!is_supported("ws"));
        assert!(!is_supported("invalid-scheme"));
    }
}
