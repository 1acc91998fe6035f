use std::fs;
use std::io::SeekFrom;

use micro_message::factory::{RequestFactory, ResponseFactory, StreamFactory, UploadedFileFactory};
use micro_message::protocol::{HttpMessage, HttpRequest, MessageError, Request, Response};
use micro_message::stream::{Body, ReaderResource, StreamError};
use micro_message::upload::{UploadError, UploadErrorCode};
use micro_message::uri::Uri;

#[test]
fn with_methods_leave_the_original_untouched() {
    let request = RequestFactory::new().get("http://example.com/a?x=1").unwrap();
    let before = request.clone();

    let changed = request
        .with_header("x-trace", "1")
        .unwrap()
        .with_method("POST")
        .unwrap()
        .with_protocol_version("2")
        .with_request_target("*");

    assert_eq!(request.method(), before.method());
    assert_eq!(request.headers(), before.headers());
    assert_eq!(request.protocol_version(), "1.1");
    assert_eq!(request.request_target(), "/a?x=1");
    assert!(!request.has_header("x-trace"));

    assert_eq!(changed.method().as_str(), "POST");
    assert_eq!(changed.protocol_version(), "2");
    assert_eq!(changed.request_target(), "*");
    assert_eq!(changed.header_line("X-Trace"), "1");
}

#[test]
fn header_values_accumulate_and_join() {
    let response = ResponseFactory::new()
        .create_response(200, "")
        .unwrap()
        .with_header("Vary", "Accept")
        .unwrap()
        .with_added_header("vary", ["Accept-Encoding", "Origin"])
        .unwrap();

    assert_eq!(response.header("VARY"), ["Accept", "Accept-Encoding", "Origin"]);
    assert_eq!(response.header_line("vary"), "Accept,Accept-Encoding,Origin");
    assert_eq!(response.header_line("missing"), "");

    let replaced = response.with_header("vary", "*").unwrap();
    assert_eq!(replaced.header("vary"), ["*"]);
    assert!(!replaced.without_header("Vary").has_header("vary"));
}

#[test]
fn invalid_header_input_is_rejected() {
    let response = Response::new();

    assert!(matches!(response.with_header("bad name", "x"), Err(MessageError::InvalidHeaderName { .. })));
    assert!(matches!(response.with_header("x-ok", "a\r\nb"), Err(MessageError::InvalidHeaderValue { .. })));
    assert!(matches!(response.with_header("x-ok", Vec::<String>::new()), Err(MessageError::InvalidHeaderValue { .. })));
}

#[test]
fn host_header_follows_uri() {
    let request = RequestFactory::new().get("http://example.com:8080/").unwrap();
    assert_eq!(request.header_line("host"), "example.com:8080");

    let moved = request.with_uri(Uri::parse("https://other.org:443/x").unwrap(), false).unwrap();
    assert_eq!(moved.header_line("host"), "other.org");

    let kept = request.with_uri(Uri::parse("http://third.net/").unwrap(), true).unwrap();
    assert_eq!(kept.header_line("host"), "example.com:8080");

    let relative = Request::default().with_uri(Uri::parse("/only/path").unwrap(), false).unwrap();
    assert!(!relative.has_header("host"));
}

#[test]
fn message_without_body_or_uri_reports_it() {
    let request = Request::default();

    assert!(matches!(request.body(), Err(MessageError::MissingField { .. })));
    assert!(matches!(request.uri(), Err(MessageError::MissingField { .. })));
    assert_eq!(request.request_target(), "/");
}

#[test]
fn response_status_and_reason() {
    let factory = ResponseFactory::new();

    let not_found = factory.create_response(404, "").unwrap();
    assert_eq!(not_found.status(), 404);
    assert_eq!(not_found.reason_phrase(), "Not Found");

    let custom = not_found.with_status(299, Some("Fine")).unwrap();
    assert_eq!(custom.reason_phrase(), "Fine");
    assert_eq!(not_found.status(), 404);

    assert!(matches!(factory.create_response(99, ""), Err(MessageError::InvalidStatus { code: 99 })));
    assert!(matches!(factory.create_response(1000, ""), Err(MessageError::InvalidStatus { code: 1000 })));
}

#[test]
fn body_is_shared_between_copies() {
    let response = ResponseFactory::new().create_response(200, "").unwrap();
    let copy = response.with_header("content-type", "text/plain").unwrap();

    response.body().unwrap().apply(|stream| stream.write(b"hello")).unwrap();

    assert!(response.body().unwrap().ptr_eq(copy.body().unwrap()));
    assert_eq!(copy.body().unwrap().to_bytes().unwrap(), "hello");
}

#[test]
fn detached_stream_fails_loudly() {
    let mut stream = StreamFactory.create_stream("abc");
    assert!(stream.detach().is_some());

    assert!(!stream.is_readable());
    assert_eq!(stream.size(), None);
    assert!(matches!(stream.read(1), Err(StreamError::Detached)));
    assert!(matches!(stream.write(b"x"), Err(StreamError::Detached)));
    assert!(matches!(stream.seek(SeekFrom::Start(0)), Err(StreamError::Detached)));
    assert!(matches!(stream.tell(), Err(StreamError::Detached)));
}

#[test]
fn non_seekable_stream_converts_only_from_the_start() {
    let mut fresh = StreamFactory.create_stream_from_resource(ReaderResource::new(&b"streamed"[..]));
    assert_eq!(fresh.to_bytes().unwrap(), "streamed");

    let mut stream = StreamFactory.create_stream_from_resource(ReaderResource::new(&b"streamed"[..]));
    assert!(!stream.is_seekable());
    assert_eq!(stream.read(3).unwrap(), "str");
    assert!(matches!(stream.rewind(), Err(StreamError::NotSeekable)));
    assert!(matches!(stream.to_bytes(), Err(StreamError::NotSeekable)));
}

#[test]
fn oversized_read_returns_what_is_there() {
    let mut stream = StreamFactory.create_stream("abc");
    assert_eq!(stream.read(usize::MAX).unwrap(), "abc");
}

#[test]
fn partly_read_non_seekable_upload_is_not_moved() {
    let dir = tempfile::tempdir().unwrap();
    let body = Body::from(StreamFactory.create_stream_from_resource(ReaderResource::new(&b"upload body"[..])));
    body.apply(|stream| stream.read(5)).unwrap();
    let upload = UploadedFileFactory.create_uploaded_file(body, Some(11), UploadErrorCode::Ok, None, None);
    let target = dir.path().join("upload.bin");

    assert!(matches!(upload.move_to(&target), Err(UploadError::Stream { source: StreamError::NotSeekable })));
    assert!(!target.exists());
    assert!(!upload.is_moved());
}

#[test]
fn uploaded_file_moves_once() {
    let dir = tempfile::tempdir().unwrap();
    let upload = UploadedFileFactory.create_uploaded_file(
        StreamFactory.create_stream("file body"),
        None,
        UploadErrorCode::Ok,
        Some("notes.txt"),
        Some("text/plain"),
    );
    assert_eq!(upload.size(), Some(9));

    let copy = upload.clone();
    upload.move_to(dir.path().join("first.txt")).unwrap();

    assert_eq!(fs::read_to_string(dir.path().join("first.txt")).unwrap(), "file body");
    assert!(copy.is_moved());
    assert!(matches!(copy.stream(), Err(UploadError::AlreadyMoved)));
    assert!(matches!(upload.move_to(dir.path().join("second.txt")), Err(UploadError::AlreadyMoved)));
    assert!(!dir.path().join("second.txt").exists());
}

#[test]
fn uploaded_file_rejects_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let upload = UploadedFileFactory.create_uploaded_file(
        Body::from(StreamFactory.create_stream("x")),
        Some(1),
        UploadErrorCode::Ok,
        None,
        None,
    );

    let result = upload.move_to(dir.path().join("missing").join("x.bin"));

    assert!(matches!(result, Err(UploadError::InvalidTarget { .. })));
    assert!(!upload.is_moved());
    assert_eq!(upload.stream().unwrap().to_bytes().unwrap(), "x");
}
