use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use pubsub_publisher::backend::memory::InMemoryBackend;
use pubsub_publisher::backend::rest::{PublishRequest, PubsubMessage};
use pubsub_publisher::backend::PublishBackend;
use pubsub_publisher::sample::{generate, SampleMessage};
use pubsub_publisher::types::{OutgoingMessage, TopicPath};

/// Create a sample message with a content field of the given size
fn create_sized_message(content_size: usize) -> SampleMessage {
    let mut message = generate(1).remove(0);
    message.content = "x".repeat(content_size);
    message
}

/// Benchmark sample message generation
fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");

    for count in [1usize, 5, 100, 1000].iter() {
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            b.iter(|| black_box(generate(count)));
        });
    }

    group.finish();
}

/// Benchmark JSON encoding of payloads of different sizes
fn bench_json_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("json_encode");

    for size in [100, 1024, 10240, 102400].iter() {
        let message = create_sized_message(*size);

        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &message, |b, message| {
            b.iter(|| black_box(OutgoingMessage::from_json(message).unwrap()));
        });
    }

    group.finish();
}

/// Benchmark building the REST request body (base64 + JSON)
fn bench_rest_body(c: &mut Criterion) {
    let mut group = c.benchmark_group("rest_body");

    for size in [100, 1024, 10240, 102400].iter() {
        let envelope = OutgoingMessage::from_json(&create_sized_message(*size))
            .unwrap()
            .with_idempotency_key();

        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &envelope, |b, envelope| {
            b.iter(|| {
                let body = PublishRequest {
                    messages: vec![PubsubMessage::from(envelope)],
                };
                black_box(serde_json::to_vec(&body).unwrap())
            });
        });
    }

    group.finish();
}

/// Benchmark publishing through the in-memory backend
fn bench_memory_publish(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let backend = InMemoryBackend::new();
    let topic = TopicPath::new("bench-project", "bench-topic").unwrap();
    let envelope = OutgoingMessage::from_json(&generate(1)[0]).unwrap();

    let (backend, topic, envelope) = (&backend, &topic, &envelope);

    c.bench_function("memory_publish", |b| {
        b.to_async(&runtime)
            .iter(|| async move { black_box(backend.publish(topic, envelope).await.unwrap()) });
    });
}

criterion_group!(
    benches,
    bench_generate,
    bench_json_encode,
    bench_rest_body,
    bench_memory_publish
);
criterion_main!(benches);
