//! Splits a URI string into its components following the RFC 3986 generic syntax:
//!
//! ```text
//! scheme ":" [ "//" authority ] path [ "?" query ] [ "#" fragment ]
//! authority = [ user [ ":" password ] "@" ] host [ ":" port ]
//! ```
//!
//! The parser is all-or-nothing: any structural problem yields an error, never a partially
//! populated [`Uri`].

use std::borrow::Cow;

use percent_encoding::percent_decode_str;
use tracing::trace;

use super::{Uri, UriError, scheme};
use crate::ensure;

pub(super) fn parse(input: &str) -> Result<Uri, UriError> {
    ensure!(
        !input.bytes().any(|b| b.is_ascii_whitespace() || b.is_ascii_control()),
        UriError::malformed(format!("{input:?} contains whitespace or control characters"))
    );

    let (rest, fragment) = split_suffix(input, '#');
    let (rest, query) = split_suffix(rest, '?');
    let (scheme, rest) = split_scheme(rest);

    let scheme = scheme.to_ascii_lowercase();
    ensure!(scheme.is_empty() || scheme::is_supported(&scheme), UriError::invalid_scheme(scheme));

    let mut uri = Uri { scheme, ..Uri::default() };

    let path = match rest.strip_prefix("//") {
        Some(after_slashes) => {
            let end = after_slashes.find('/').unwrap_or(after_slashes.len());
            let (authority, path) = after_slashes.split_at(end);
            parse_authority(authority, &mut uri)?;
            path
        }
        None => rest,
    };

    uri.path = path.to_string();
    uri.query = query.to_string();
    uri.fragment = fragment.to_string();

    trace!(input, scheme = uri.scheme.as_str(), host = uri.host.as_str(), "parsed uri");
    Ok(uri)
}

/// Splits `input` at the first `delimiter`, the suffix is empty when it is absent.
fn split_suffix(input: &str, delimiter: char) -> (&str, &str) {
    input.split_once(delimiter).unwrap_or((input, ""))
}

/// Splits a leading `scheme:` off `input`. A colon that appears after the first `/` belongs to
/// the path, and a candidate that is not `ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )` is not a
/// scheme.
fn split_scheme(input: &str) -> (&str, &str) {
    let Some((candidate, rest)) = input.split_once(':') else {
        return ("", input);
    };

    let mut chars = candidate.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));

    if valid { (candidate, rest) } else { ("", input) }
}

fn parse_authority(authority: &str, uri: &mut Uri) -> Result<(), UriError> {
    let (user_info, host_port) = match authority.rsplit_once('@') {
        Some((user_info, host_port)) => (Some(user_info), host_port),
        None => (None, authority),
    };

    if let Some(user_info) = user_info {
        let (user, password) = match user_info.split_once(':') {
            Some((user, password)) => (user, Some(password)),
            None => (user_info, None),
        };
        uri.user = decode_user_info(user)?;
        uri.password = password.map(decode_user_info).transpose()?;
    }

    let (host, port) = split_host_port(host_port)?;
    ensure!(!host.is_empty(), UriError::malformed(format!("authority {authority:?} has an empty host")));

    uri.host = host.to_ascii_lowercase();
    uri.port = port;
    Ok(())
}

/// Percent-decodes a user name or password, which must decode to UTF-8.
fn decode_user_info(raw: &str) -> Result<String, UriError> {
    percent_decode_str(raw)
        .decode_utf8()
        .map(Cow::into_owned)
        .map_err(|e| UriError::malformed(format!("user info {raw:?} is not utf-8 once decoded: {e}")))
}

/// Splits `host[:port]`. IPv6 literals keep their brackets in the host.
fn split_host_port(input: &str) -> Result<(&str, Option<u16>), UriError> {
    let (host, port) = if input.starts_with('[') {
        let end = input.find(']').ok_or_else(|| UriError::malformed(format!("unterminated ipv6 literal {input:?}")))?;
        let (host, remainder) = input.split_at(end + 1);
        match remainder {
            "" => (host, None),
            _ => match remainder.strip_prefix(':') {
                Some(port) => (host, Some(port)),
                None => return Err(UriError::malformed(format!("unexpected {remainder:?} after ipv6 literal"))),
            },
        }
    } else {
        match input.split_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (input, None),
        }
    };

    match port {
        // "host:" is allowed by the grammar and means no port
        None | Some("") => Ok((host, None)),
        Some(port) => parse_port(port).map(|port| (host, Some(port))),
    }
}

fn parse_port(port: &str) -> Result<u16, UriError> {
    ensure!(port.bytes().all(|b| b.is_ascii_digit()), UriError::malformed(format!("port {port:?} is not numeric")));

    let port = port.parse::<u32>().map_err(|e| UriError::malformed(format!("port {port:?}: {e}")))?;
    ensure!((1..=u32::from(u16::MAX)).contains(&port), UriError::invalid_port(port));

    u16::try_from(port).map_err(UriError::malformed)
}
