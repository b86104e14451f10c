use bytes::BytesMut;
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use otp_protocol::core::cipher::ALPHABET;
use otp_protocol::core::header::{Header, HeaderCodec};
use otp_protocol::{decode, encode};
use tokio_util::codec::{Decoder, Encoder};

fn symbols(len: usize, stride: usize) -> Vec<u8> {
    (0..len).map(|i| ALPHABET[(i * stride) % ALPHABET.len()]).collect()
}

fn bench_pad(c: &mut Criterion) {
    let mut group = c.benchmark_group("pad");

    for size in [64usize, 4_096, 100_000] {
        let text = symbols(size, 7);
        let key = symbols(size, 11);
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_function(format!("decode_{size}"), |b| {
            b.iter(|| decode(black_box(&text), black_box(&key)).unwrap())
        });
        group.bench_function(format!("encode_{size}"), |b| {
            b.iter(|| encode(black_box(&text), black_box(&key)).unwrap())
        });
    }

    group.finish();
}

fn bench_header(c: &mut Criterion) {
    let mut group = c.benchmark_group("header");
    let header = Header::new("dec", 100_000, 100_000);

    group.bench_function("encode", |b| {
        b.iter_batched(
            || (HeaderCodec::for_tag("dec"), BytesMut::with_capacity(26)),
            |(mut codec, mut buf)| codec.encode(header.clone(), &mut buf).unwrap(),
            BatchSize::SmallInput,
        )
    });

    let mut encoded = BytesMut::new();
    HeaderCodec::for_tag("dec")
        .encode(header.clone(), &mut encoded)
        .unwrap();
    group.bench_function("decode", |b| {
        b.iter_batched(
            || encoded.clone(),
            |mut buf| HeaderCodec::for_tag("dec").decode(&mut buf).unwrap(),
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

criterion_group!(benches, bench_pad, bench_header);
criterion_main!(benches);
