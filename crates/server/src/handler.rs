//! Request handlers: turn a [`ServerRequest`] into a [`Response`].

use std::error::Error;
use std::fmt;

use micro_message::factory::ResponseFactory;
use micro_message::protocol::{MessageError, Response};

use crate::ServerRequest;

pub type HandlerError = Box<dyn Error + Send + Sync>;

pub trait RequestHandler: Send + Sync {
    fn handle(&self, request: ServerRequest) -> Result<Response, HandlerError>;
}

/// What a handler gets next to the request: the factory its responses are built with.
#[derive(Debug, Clone, Default)]
pub struct HandlerContext {
    responses: ResponseFactory,
}

impl HandlerContext {
    pub fn new(responses: ResponseFactory) -> Self {
        Self { responses }
    }

    /// A response with an empty body, an empty `reason` selects the canonical phrase.
    pub fn response(&self, code: u16, reason: &str) -> Result<Response, MessageError> {
        self.responses.create_response(code, reason)
    }
}

/// A plain function used as a [`RequestHandler`].
pub struct FnHandler<F> {
    f: F,
    context: HandlerContext,
}

impl<F> fmt::Debug for FnHandler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHandler").field("context", &self.context).finish_non_exhaustive()
    }
}

impl<F> FnHandler<F> {
    #[must_use]
    pub fn with_context(self, context: HandlerContext) -> Self {
        Self { context, ..self }
    }
}

pub fn handler_fn<F>(f: F) -> FnHandler<F>
where
    F: Fn(&HandlerContext, ServerRequest) -> Result<Response, HandlerError> + Send + Sync,
{
    FnHandler { f, context: HandlerContext::default() }
}

impl<F> RequestHandler for FnHandler<F>
where
    F: Fn(&HandlerContext, ServerRequest) -> Result<Response, HandlerError> + Send + Sync,
{
    fn handle(&self, request: ServerRequest) -> Result<Response, HandlerError> {
        (self.f)(&self.context, request)
    }
}

impl<H: RequestHandler + ?Sized> RequestHandler for Box<H> {
    fn handle(&self, request: ServerRequest) -> Result<Response, HandlerError> {
        (**self).handle(request)
    }
}
