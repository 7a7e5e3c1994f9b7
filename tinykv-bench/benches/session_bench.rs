//! Session round-trip benchmarks over an in-memory stream.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use tinykv_client::{ConnectionConfig, Session};
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};
use tokio::runtime::Runtime;

/// Answers every frame with a success status byte.
async fn ack_server(mut stream: DuplexStream) {
    let mut buf = vec![0u8; 64 * 1024];
    loop {
        match stream.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(_) => {
                if stream.write_all(&[1]).await.is_err() {
                    break;
                }
            }
        }
    }
}

fn setup(rt: &Runtime) -> Session<DuplexStream> {
    let (client, server) = tokio::io::duplex(64 * 1024);
    rt.spawn(ack_server(server));
    Session::from_stream(ConnectionConfig::default(), client)
}

fn bench_round_trips(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let session = setup(&rt);

    let mut group = c.benchmark_group("session");
    group.throughput(Throughput::Elements(1));

    group.bench_function("ping", |b| {
        b.to_async(&rt)
            .iter(|| async { black_box(session.ping().await.unwrap()) });
    });

    group.bench_function("set_text", |b| {
        b.to_async(&rt)
            .iter(|| async { black_box(session.set("bench-key", "value").await.unwrap()) });
    });

    group.bench_function("exists", |b| {
        b.to_async(&rt)
            .iter(|| async { black_box(session.exists("bench-key").await.unwrap()) });
    });

    group.finish();
}

criterion_group!(benches, bench_round_trips);
criterion_main!(benches);
