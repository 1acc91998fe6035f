//! Requests as seen by the server that received them.

use std::collections::BTreeMap;

use micro_message::protocol::{HttpMessage, HttpRequest, Message, Request};
use micro_message::upload::UploadedFiles;
use serde::de::DeserializeOwned;
use serde_json::Value;
use triomphe::Arc;

use crate::ServerRequestError;

/// String parameters by name: server info, cookies or query values.
pub type Params = BTreeMap<String, String>;

/// A [`Request`] plus everything the receiving server knows about it: server info, cookies,
/// query values, uploaded files, the parsed body and attributes added along the pipeline.
///
/// Like every message value it is changed only through `with_*` methods returning a copy.
/// The attribute bag is shared between copies until one of them changes it.
#[derive(Debug, Clone, Default)]
pub struct ServerRequest {
    request: Request,
    server_params: Params,
    cookie_params: Params,
    query_params: Params,
    uploaded_files: UploadedFiles,
    parsed_body: Option<Value>,
    attributes: Arc<BTreeMap<String, Value>>,
}

impl ServerRequest {
    pub fn new(request: Request) -> Self {
        Self { request, ..Self::default() }
    }

    pub fn into_request(self) -> Request {
        self.request
    }

    pub fn server_params(&self) -> &Params {
        &self.server_params
    }

    #[must_use]
    pub fn with_server_params(&self, params: Params) -> Self {
        Self { server_params: params, ..self.clone() }
    }

    pub fn cookie_params(&self) -> &Params {
        &self.cookie_params
    }

    #[must_use]
    pub fn with_cookie_params(&self, cookies: Params) -> Self {
        Self { cookie_params: cookies, ..self.clone() }
    }

    /// Query values, usually derived from the URI's query when the request was created. They are
    /// not kept in sync with the URI afterwards.
    pub fn query_params(&self) -> &Params {
        &self.query_params
    }

    #[must_use]
    pub fn with_query_params(&self, query: Params) -> Self {
        Self { query_params: query, ..self.clone() }
    }

    /// Deserializes the URI's raw query, nested keys such as `user[name]=x` included.
    pub fn query_as<T: DeserializeOwned>(&self) -> Result<T, ServerRequestError> {
        let query = self.uri().map(|uri| uri.raw_query().to_string()).unwrap_or_default();
        Ok(serde_qs::from_str(&query)?)
    }

    pub fn uploaded_files(&self) -> &UploadedFiles {
        &self.uploaded_files
    }

    #[must_use]
    pub fn with_uploaded_files(&self, files: UploadedFiles) -> Self {
        Self { uploaded_files: files, ..self.clone() }
    }

    pub fn parsed_body(&self) -> Option<&Value> {
        self.parsed_body.as_ref()
    }

    #[must_use]
    pub fn with_parsed_body(&self, body: Option<Value>) -> Self {
        Self { parsed_body: body, ..self.clone() }
    }

    /// The parsed body deserialized as `T`, `None` when there is no parsed body.
    pub fn parsed_body_as<T: DeserializeOwned>(&self) -> Result<Option<T>, ServerRequestError> {
        match &self.parsed_body {
            Some(body) => Ok(Some(T::deserialize(body)?)),
            None => Ok(None),
        }
    }

    pub fn attributes(&self) -> &BTreeMap<String, Value> {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn attribute_or<'a>(&'a self, name: &str, default: &'a Value) -> &'a Value {
        self.attribute(name).unwrap_or(default)
    }

    #[must_use]
    pub fn with_attribute(&self, name: &str, value: impl Into<Value>) -> Self {
        let mut new = self.clone();
        Arc::make_mut(&mut new.attributes).insert(name.to_string(), value.into());
        new
    }

    #[must_use]
    pub fn without_attribute(&self, name: &str) -> Self {
        let mut new = self.clone();
        if self.attributes.contains_key(name) {
            Arc::make_mut(&mut new.attributes).remove(name);
        }
        new
    }
}

impl From<Request> for ServerRequest {
    fn from(request: Request) -> Self {
        Self::new(request)
    }
}

impl HttpMessage for ServerRequest {
    fn message(&self) -> &Message {
        self.request.message()
    }

    fn message_mut(&mut self) -> &mut Message {
        self.request.message_mut()
    }
}

impl HttpRequest for ServerRequest {
    fn request(&self) -> &Request {
        &self.request
    }

    fn request_mut(&mut self) -> &mut Request {
        &mut self.request
    }
}
