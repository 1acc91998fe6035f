//! Walks a request through a small pipeline of stages, each deriving its own version of the
//! message, then answers it and stores an uploaded file.

use std::error::Error;

use micro_message::factory::{RequestFactory, ResponseFactory, StreamFactory, UploadedFileFactory};
use micro_message::protocol::{HttpMessage, HttpRequest, Request};
use micro_message::upload::UploadErrorCode;
use micro_message::uri::Uri;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

fn tag_request(request: &Request) -> Result<Request, Box<dyn Error>> {
    Ok(request.with_header("x-request-id", "7f3a")?)
}

fn route_to_backend(request: &Request) -> Result<Request, Box<dyn Error>> {
    let backend = request.uri()?.with_host("backend.internal").with_port(Some(8080))?;
    Ok(request.with_uri(backend, true)?)
}

fn main() -> Result<(), Box<dyn Error>> {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::DEBUG).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let incoming = RequestFactory::new().create_request("GET", "http://example.com/reports?year=2024")?;
    let tagged = tag_request(&incoming)?;
    let routed = route_to_backend(&tagged)?;

    let (incoming_uri, routed_uri) = (incoming.uri()?, routed.uri()?);
    info!(uri = %incoming_uri, host = %incoming.header_line("host"), "incoming request");
    info!(uri = %routed_uri, host = %routed.header_line("host"), request_id = %routed.header_line("x-request-id"), "routed request");
    info!(request_target = %routed.request_target(), "request target");

    let response = ResponseFactory::new().create_response(200, "")?.with_header("content-type", "text/csv")?;
    response.body()?.apply(|body| body.write(b"year,total\n2024,42\n"))?;
    let body = response.body()?.to_string_lossy()?;
    info!(status = response.status(), reason = response.reason_phrase(), body = %body, "response");

    let upload = UploadedFileFactory.create_uploaded_file(
        StreamFactory.create_stream("uploaded bytes"),
        None,
        UploadErrorCode::Ok,
        Some("report.csv"),
        Some("text/csv"),
    );
    let dir = tempfile::tempdir()?;
    let target = dir.path().join("report.csv");
    upload.move_to(&target)?;
    info!(path = %target.display(), size = ?upload.size(), moved = upload.is_moved(), "stored upload");

    let relative = Uri::parse("//cdn.example.com/assets/app.js")?;
    info!(uri = %relative, authority = %relative.authority(), "network path reference");

    Ok(())
}
