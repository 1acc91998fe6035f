use std::hint::black_box;

use bencher::{TestCase, TestFile};
use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use micro_message::factory::RequestFactory;
use micro_message::protocol::{HttpMessage, Request};

static FULL: TestFile = TestFile::new("full.txt", include_str!("../resources/uri/full.txt"));

fn create_test_cases() -> Vec<TestCase> {
    vec![TestCase::small("few_headers", FULL), TestCase::large("many_headers", FULL)]
}

fn request_with_headers(case: &TestCase) -> Request {
    let mut request = RequestFactory::new().get(case.input()).expect("benchmark input should be a valid uri");
    for i in 0..case.group().header_count() {
        request = request.with_header(&format!("x-bench-{i}"), format!("value-{i}")).expect("header should be valid");
    }
    request
}

fn benchmark_with_header(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("with_header");

    for case in create_test_cases() {
        let request = request_with_headers(&case);
        group.bench_with_input(BenchmarkId::new(case.name(), case.file().file_name()), &request, |b, request| {
            b.iter(|| {
                let changed = request.with_added_header("accept", "text/html").expect("header should be valid");
                black_box(changed);
            });
        });
    }

    group.finish();
}

fn benchmark_shared_headers(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("shared_headers");

    for case in create_test_cases() {
        let request = request_with_headers(&case);
        group.bench_with_input(BenchmarkId::new(case.name(), case.file().file_name()), &request, |b, request| {
            b.iter_batched(
                || request.clone(),
                |request| black_box(request.with_protocol_version("2")),
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn benchmark_header_line(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("header_line");

    for case in create_test_cases() {
        let request = request_with_headers(&case).with_added_header("accept", ["text/html", "application/json"]).expect("header should be valid");
        group.bench_with_input(BenchmarkId::new(case.name(), case.file().file_name()), &request, |b, request| {
            b.iter(|| black_box(request.header_line(black_box("Accept"))));
        });
    }

    group.finish();
}

criterion_group!(headers, benchmark_with_header, benchmark_shared_headers, benchmark_header_line);
criterion_main!(headers);
