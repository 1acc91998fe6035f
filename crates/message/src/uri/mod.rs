//! Immutable URI values.
//!
//! A [`Uri`] holds the six RFC 3986 components (scheme, user info, host, port, path, query and
//! fragment) and is changed only through `with_*` methods that return a new value:
//!
//! ```
//! use micro_message::uri::Uri;
//!
//! let base = Uri::parse("http://example.com:8080/index.html?a=1").unwrap();
//! let moved = base.with_port(Some(80)).unwrap().with_path("/other");
//!
//! assert_eq!(base.to_string(), "http://example.com:8080/index.html?a=1");
//! assert_eq!(moved.to_string(), "http://example.com/other?a=1");
//! assert_eq!(moved.port(), None);
//! ```
//!
//! # Normalization
//!
//! - scheme and host are lower-cased on write
//! - the scheme must be empty or one of [`scheme::SCHEMES`]
//! - the port is hidden on read when it equals the scheme's default port; storing it is allowed
//! - path, query and fragment are stored raw; query and fragment are percent-decoded on read
//! - user and password are stored decoded and percent-encoded when the authority is rendered

mod error;
mod parser;
pub mod scheme;

pub use error::UriError;

use std::borrow::Cow;
use std::fmt;
use std::fmt::Write;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};

use crate::ensure;

/// Characters escaped in a rendered password. User info is stored decoded, so `%` is escaped
/// too and parsing the rendered form gives back the stored value.
const PASSWORD: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'%')
    .add(b'"')
    .add(b'#')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'@')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// A user name additionally escapes `:`, which separates it from the password.
const USER: &AsciiSet = &PASSWORD.add(b':');

/// An immutable URI value.
///
/// Equality and hashing compare the observable components, so a stored default port is
/// equal to no port at all.
#[derive(Debug, Clone, Default)]
pub struct Uri {
    scheme: String,
    user: String,
    password: Option<String>,
    host: String,
    port: Option<u16>,
    path: String,
    query: String,
    fragment: String,
}

impl Uri {
    /// Creates an empty URI, every component empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `input` into its components.
    ///
    /// # Errors
    ///
    /// Returns [`UriError::Malformed`] for structurally invalid input, [`UriError::InvalidScheme`]
    /// for a scheme outside [`scheme::SCHEMES`] and [`UriError::InvalidPort`] for a port outside
    /// `1..=65535`.
    pub fn parse(input: &str) -> Result<Self, UriError> {
        parser::parse(input)
    }

    /// Returns the registered default port of `scheme`, if any.
    #[inline]
    pub fn default_port(scheme: &str) -> Option<u16> {
        scheme::default_port(scheme)
    }

    /// Returns the lower-cased scheme, empty for a relative reference.
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Returns the decoded user name.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Returns the decoded password, if one was given.
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// Returns the encoded `user[:password]` part, empty when there is no user.
    pub fn user_info(&self) -> String {
        let mut user_info = String::new();
        self.write_user_info(&mut user_info).unwrap_or_default();
        user_info
    }

    /// Returns the lower-cased host.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port, or `None` when it is absent or equals the scheme's default port.
    pub fn port(&self) -> Option<u16> {
        match (self.port, scheme::default_port(&self.scheme)) {
            (Some(port), Some(default_port)) if port == default_port => None,
            (port, _) => port,
        }
    }

    /// Returns `[user-info@]host[:port]`, or an empty string when both user info and host
    /// are empty.
    pub fn authority(&self) -> String {
        let mut authority = String::new();
        self.write_authority(&mut authority).unwrap_or_default();
        authority
    }

    /// Returns the raw path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the percent-decoded query, invalid UTF-8 replaced.
    pub fn query(&self) -> Cow<'_, str> {
        percent_decode_str(&self.query).decode_utf8_lossy()
    }

    /// Returns the query exactly as stored.
    pub fn raw_query(&self) -> &str {
        &self.query
    }

    /// Returns the percent-decoded fragment, invalid UTF-8 replaced.
    pub fn fragment(&self) -> Cow<'_, str> {
        percent_decode_str(&self.fragment).decode_utf8_lossy()
    }

    /// Returns the fragment exactly as stored.
    pub fn raw_fragment(&self) -> &str {
        &self.fragment
    }

    /// Returns a copy with the scheme replaced.
    ///
    /// # Errors
    ///
    /// Returns [`UriError::InvalidScheme`] when `scheme` is neither empty nor listed in
    /// [`scheme::SCHEMES`].
    pub fn with_scheme(&self, scheme: &str) -> Result<Self, UriError> {
        let scheme = scheme.to_ascii_lowercase();
        ensure!(scheme.is_empty() || scheme::is_supported(&scheme), UriError::invalid_scheme(scheme));

        let mut uri = self.clone();
        uri.scheme = scheme;
        Ok(uri)
    }

    /// Returns a copy with the user and password replaced. An empty user removes the user info
    /// from the rendered authority.
    pub fn with_user_info(&self, user: &str, password: Option<&str>) -> Self {
        let mut uri = self.clone();
        uri.user = user.to_string();
        uri.password = password.map(str::to_string);
        uri
    }

    /// Returns a copy with the host replaced. An empty host is allowed.
    pub fn with_host(&self, host: &str) -> Self {
        let mut uri = self.clone();
        uri.host = host.to_ascii_lowercase();
        uri
    }

    /// Returns a copy with the port replaced, `None` clears it.
    ///
    /// # Errors
    ///
    /// Returns [`UriError::InvalidPort`] for port `0`.
    pub fn with_port(&self, port: Option<u16>) -> Result<Self, UriError> {
        ensure!(port != Some(0), UriError::invalid_port(0));

        let mut uri = self.clone();
        uri.port = port;
        Ok(uri)
    }

    /// Returns a copy with the path replaced, stored as given.
    pub fn with_path(&self, path: &str) -> Self {
        let mut uri = self.clone();
        uri.path = path.to_string();
        uri
    }

    /// Returns a copy with the query replaced, stored as given.
    pub fn with_query(&self, query: &str) -> Self {
        let mut uri = self.clone();
        uri.query = query.to_string();
        uri
    }

    /// Returns a copy with the fragment replaced, stored as given.
    pub fn with_fragment(&self, fragment: &str) -> Self {
        let mut uri = self.clone();
        uri.fragment = fragment.to_string();
        uri
    }

    fn write_user_info<W: Write>(&self, w: &mut W) -> fmt::Result {
        if self.user.is_empty() {
            return Ok(());
        }

        write!(w, "{}", utf8_percent_encode(&self.user, USER))?;
        if let Some(password) = &self.password {
            write!(w, ":{}", utf8_percent_encode(password, PASSWORD))?;
        }
        Ok(())
    }

    fn write_authority<W: Write>(&self, w: &mut W) -> fmt::Result {
        if self.user.is_empty() && self.host.is_empty() {
            return Ok(());
        }

        if !self.user.is_empty() {
            self.write_user_info(w)?;
            w.write_char('@')?;
        }
        w.write_str(&self.host)?;
        if let Some(port) = self.port() {
            write!(w, ":{port}")?;
        }
        Ok(())
    }

    fn has_authority(&self) -> bool {
        !self.user.is_empty() || !self.host.is_empty()
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.scheme.is_empty() {
            write!(f, "{}:", self.scheme)?;
        }

        let has_authority = self.has_authority();
        if has_authority {
            f.write_str("//")?;
            self.write_authority(f)?;
        }

        match self.path.as_str() {
            // a rootless path would merge into the authority
            path if has_authority && !path.is_empty() && !path.starts_with('/') => write!(f, "/{path}")?,
            // without authority a leading "//" would be read back as one
            path if !has_authority && path.starts_with("//") => write!(f, "/{}", path.trim_start_matches('/'))?,
            path => f.write_str(path)?,
        }

        if !self.query.is_empty() {
            write!(f, "?{}", self.query)?;
        }
        if !self.fragment.is_empty() {
            write!(f, "#{}", self.fragment)?;
        }
        Ok(())
    }
}

impl PartialEq for Uri {
    fn eq(&self, other: &Self) -> bool {
        self.scheme == other.scheme
            && self.user == other.user
            && self.password == other.password
            && self.host == other.host
            && self.port() == other.port()
            && self.path == other.path
            && self.query == other.query
            && self.fragment == other.fragment
    }
}

impl Eq for Uri {}

impl Hash for Uri {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.scheme.hash(state);
        self.user.hash(state);
        self.password.hash(state);
        self.host.hash(state);
        self.port().hash(state);
        self.path.hash(state);
        self.query.hash(state);
        self.fragment.hash(state);
    }
}

impl FromStr for Uri {
    type Err = UriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Converts into the `http` crate's URI. The fragment is dropped, `http::Uri` has none.
impl TryFrom<&Uri> for http::Uri {
    type Error = UriError;

    fn try_from(uri: &Uri) -> Result<Self, Self::Error> {
        http::Uri::try_from(uri.to_string()).map_err(UriError::malformed)
    }
}

impl TryFrom<&http::Uri> for Uri {
    type Error = UriError;

    fn try_from(uri: &http::Uri) -> Result<Self, Self::Error> {
        Self::parse(&uri.to_string())
    }
}
