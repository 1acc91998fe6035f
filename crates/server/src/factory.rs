//! Builds [`ServerRequest`] values from an explicit [`ServerParams`] context.

use micro_message::factory::{IntoUri, StreamFactory};
use micro_message::protocol::{HttpMessage, HttpRequest};
use micro_message::uri::Uri;
use tracing::{debug, warn};

use crate::normalizer::{StreamOpener, UploadedFileNormalizer};
use crate::{Params, ServerParams, ServerRequest, ServerRequestError};

/// Creates server requests.
///
/// ```
/// use micro_message::protocol::{HttpMessage, HttpRequest};
/// use micro_message_server::{ServerParams, ServerRequestFactory};
///
/// let mut params = ServerParams::default();
/// params.headers.insert("Accept".into(), "text/html, application/json".into());
/// params.query.insert("debug".into(), "1".into());
///
/// let factory = ServerRequestFactory::new();
/// let request = factory.create_server_request("GET", "http://example.com/items?page=2", params).unwrap();
///
/// assert_eq!(request.header("accept"), ["text/html", "application/json"]);
/// assert_eq!(request.query_params()["page"], "2");
/// assert_eq!(request.query_params()["debug"], "1");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ServerRequestFactory {
    prototype: ServerRequest,
    normalizer: UploadedFileNormalizer,
}

impl ServerRequestFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> ServerRequestFactoryBuilder {
        ServerRequestFactoryBuilder::default()
    }

    /// Builds a request for `method` and `uri` from the captured `params`.
    ///
    /// Query values come from the URI's query (the last occurrence of a key wins) overlaid by
    /// `params.query`. A captured header replaces any header of the same name, including the
    /// `Host` derived from the URI. Only comma-separated list headers such as `Accept` are split
    /// on `,`; every other header keeps its captured value whole.
    pub fn create_server_request(
        &self,
        method: &str,
        uri: impl IntoUri,
        params: ServerParams,
    ) -> Result<ServerRequest, ServerRequestError> {
        let uri = uri.into_uri()?;
        debug!(method, uri = %uri, "create server request");

        let mut query: Params = serde_urlencoded::from_str::<Vec<(String, String)>>(uri.raw_query())?.into_iter().collect();
        query.extend(params.query);

        let uploaded_files = self.normalizer.normalize(&params.files)?;

        let mut request = self
            .prototype
            .with_method(method)?
            .with_uri(uri, false)?
            .with_server_params(params.server)
            .with_query_params(query)
            .with_cookie_params(params.cookies)
            .with_uploaded_files(uploaded_files)
            .with_body(StreamFactory.create_stream(&params.body))
            .with_parsed_body(params.parsed_body);

        for (name, value) in params.attributes {
            request = request.with_attribute(&name, value);
        }

        for (name, value) in &params.headers {
            request = request.with_header(name, header_values(name, value))?;
        }

        Ok(request)
    }

    /// Builds a request whose method and URI are taken from the CGI-style `server` params:
    /// `REQUEST_METHOD`, `HTTPS`, `HTTP_HOST`, `REQUEST_URI`, `PHP_AUTH_USER` and `PHP_AUTH_PW`.
    pub fn create_from_server_params(&self, params: ServerParams) -> Result<ServerRequest, ServerRequestError> {
        let method = params.method().to_string();
        let uri = uri_from_server(&params)?;
        self.create_server_request(&method, uri, params)
    }
}

/// Headers whose value is a comma-separated list of elements.
const LIST_HEADERS: &[&str] = &[
    "accept",
    "accept-charset",
    "accept-encoding",
    "accept-language",
    "allow",
    "cache-control",
    "connection",
    "content-encoding",
    "content-language",
    "if-match",
    "if-none-match",
    "pragma",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "vary",
    "via",
    "x-forwarded-for",
    "x-forwarded-host",
    "x-forwarded-proto",
];

fn header_values<'a>(name: &str, value: &'a str) -> Vec<&'a str> {
    if LIST_HEADERS.iter().any(|list| list.eq_ignore_ascii_case(name)) {
        let pieces: Vec<&str> = value.split(',').map(str::trim).filter(|piece| !piece.is_empty()).collect();
        if !pieces.is_empty() {
            return pieces;
        }
    }
    vec![value.trim()]
}

fn uri_from_server(params: &ServerParams) -> Result<Uri, ServerRequestError> {
    let host = params.server_param("HTTP_HOST").ok_or_else(|| ServerRequestError::missing_server_param("HTTP_HOST"))?;
    let scheme = if params.is_https() { "https" } else { "http" };
    let request_uri = params.server_param("REQUEST_URI").unwrap_or("/");

    let mut uri = Uri::parse(&format!("{scheme}://{host}{request_uri}"))?;
    if let Some(user) = params.server_param("PHP_AUTH_USER") {
        uri = uri.with_user_info(user, params.server_param("PHP_AUTH_PW"));
    }
    Ok(uri)
}

#[derive(Debug, Default)]
pub struct ServerRequestFactoryBuilder {
    prototype: Option<ServerRequest>,
    normalizer: Option<UploadedFileNormalizer>,
}

impl ServerRequestFactoryBuilder {
    /// The request every built request starts from, e.g. one carrying default attributes.
    #[must_use]
    pub fn prototype(mut self, prototype: ServerRequest) -> Self {
        if prototype.uri().is_ok() {
            warn!("server request prototype has a uri, it is replaced on every request");
        }
        self.prototype = Some(prototype);
        self
    }

    /// How temporary upload files are opened.
    #[must_use]
    pub fn opener<O: StreamOpener + Send + Sync + 'static>(mut self, opener: O) -> Self {
        self.normalizer = Some(UploadedFileNormalizer::new(opener));
        self
    }

    pub fn build(self) -> ServerRequestFactory {
        ServerRequestFactory {
            prototype: self.prototype.unwrap_or_default(),
            normalizer: self.normalizer.unwrap_or_default(),
        }
    }
}
