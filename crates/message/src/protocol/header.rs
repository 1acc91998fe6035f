//! The multi-valued header map carried by every message.

use http::{HeaderMap, HeaderName, HeaderValue};

use super::MessageError;
use crate::ensure;

/// An ordered, case-insensitive map from header name to its values.
///
/// Names are stored lower-cased. Every stored name has at least one value, and the order of
/// values is the order they were added in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(HeaderName, Vec<String>)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct header names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// The values of `name`, empty when the header is absent.
    pub fn get(&self, name: &str) -> &[String] {
        self.position(name).map_or(&[], |i| self.entries[i].1.as_slice())
    }

    /// The values of `name` joined with `,`, empty when the header is absent.
    pub fn line(&self, name: &str) -> String {
        self.get(name).join(",")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HeaderName, &[String])> {
        self.entries.iter().map(|(name, values)| (name, values.as_slice()))
    }

    /// Converts into an [`http::HeaderMap`], one entry per value.
    pub fn to_header_map(&self) -> Result<HeaderMap, MessageError> {
        let mut map = HeaderMap::with_capacity(self.entries.len());
        for (name, values) in &self.entries {
            for value in values {
                let value = HeaderValue::from_bytes(value.as_bytes()).map_err(|e| MessageError::invalid_header_value(name, e))?;
                map.append(name.clone(), value);
            }
        }
        Ok(map)
    }

    pub(crate) fn set(&mut self, name: HeaderName, values: Vec<String>) {
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = values,
            None => self.entries.push((name, values)),
        }
    }

    pub(crate) fn append(&mut self, name: HeaderName, values: Vec<String>) {
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => existing.extend(values),
            None => self.entries.push((name, values)),
        }
    }

    pub(crate) fn remove(&mut self, name: &str) -> bool {
        match self.position(name) {
            Some(i) => {
                self.entries.remove(i);
                true
            }
            None => false,
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        // an invalid name can never have been stored
        let name = HeaderName::from_bytes(name.as_bytes()).ok()?;
        self.entries.iter().position(|(n, _)| *n == name)
    }
}

impl TryFrom<&HeaderMap> for Headers {
    type Error = MessageError;

    fn try_from(map: &HeaderMap) -> Result<Self, Self::Error> {
        let mut headers = Headers::new();
        for (name, value) in map {
            let value = value.to_str().map_err(|e| MessageError::invalid_header_value(name, e))?;
            headers.append(name.clone(), vec![value.to_string()]);
        }
        Ok(headers)
    }
}

/// Validates a header name, lower-casing it.
pub(crate) fn header_name(name: &str) -> Result<HeaderName, MessageError> {
    HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
        tracing::warn!(name, cause = %e, "rejected header name");
        MessageError::invalid_header_name(name)
    })
}

/// Validates header values: at least one, none containing CR, LF or NUL.
pub(crate) fn header_values(name: &HeaderName, values: Vec<String>) -> Result<Vec<String>, MessageError> {
    ensure!(!values.is_empty(), MessageError::invalid_header_value(name, "no values given"));

    for value in &values {
        if let Err(e) = HeaderValue::from_bytes(value.as_bytes()) {
            tracing::warn!(name = name.as_str(), cause = %e, "rejected header value");
            return Err(MessageError::invalid_header_value(name, e));
        }
    }
    Ok(values)
}

/// Anything that can be turned into the values of one header.
pub trait IntoHeaderValues {
    fn into_header_values(self) -> Vec<String>;
}

impl IntoHeaderValues for &str {
    fn into_header_values(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoHeaderValues for String {
    fn into_header_values(self) -> Vec<String> {
        vec![self]
    }
}

impl IntoHeaderValues for &String {
    fn into_header_values(self) -> Vec<String> {
        vec![self.clone()]
    }
}

impl IntoHeaderValues for Vec<String> {
    fn into_header_values(self) -> Vec<String> {
        self
    }
}

impl IntoHeaderValues for Vec<&str> {
    fn into_header_values(self) -> Vec<String> {
        self.into_iter().map(str::to_string).collect()
    }
}

impl IntoHeaderValues for &[&str] {
    fn into_header_values(self) -> Vec<String> {
        self.iter().map(|v| (*v).to_string()).collect()
    }
}

impl IntoHeaderValues for &[String] {
    fn into_header_values(self) -> Vec<String> {
        self.to_vec()
    }
}

impl<const N: usize> IntoHeaderValues for [&str; N] {
    fn into_header_values(self) -> Vec<String> {
        self.into_iter().map(str::to_string).collect()
    }
}
