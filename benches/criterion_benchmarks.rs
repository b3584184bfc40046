use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use deltaseal::compact;
use deltaseal::compress::Codec;
use deltaseal::pipeline::{self, PipelineOptions};
use serde_json::{Value, json};

const KEY: &str = "bench-key-bench-key-bench-key-be";

fn fleet(vessels: u32, updates: u32) -> Value {
    let records: Vec<Value> = (0..vessels)
        .map(|v| {
            let updates: Vec<Value> = (0..updates)
                .map(|u| {
                    json!({
                        "timestamp": format!("2024-03-01T10:{:02}:{:02}.000Z", u / 60, u % 60),
                        "values": [
                            {"path": "navigation.position", "value": {"latitude": 60.1 + f64::from(u) * 1e-4, "longitude": 24.9}},
                            {"path": "environment.wind.speedApparent", "value": 10.5},
                            {"path": "propulsion.main.revolutions", "value": 21.0},
                            {"path": "networking.lte.rssi", "value": -70}
                        ]
                    })
                })
                .collect();
            json!({
                "context": format!("vessels.urn:mrn:imo:mmsi:{}", 230000000 + v),
                "updates": updates
            })
        })
        .collect();
    Value::Array(records)
}

fn bench_compaction(c: &mut Criterion) {
    let mut g = c.benchmark_group("compaction");
    for vessels in [1u32, 10, 100] {
        let records = fleet(vessels, 10);
        let bytes = serde_json::to_vec(&records).unwrap().len() as u64;
        let compacted = compact::compact(&records);
        g.throughput(Throughput::Bytes(bytes));
        g.bench_with_input(BenchmarkId::new("compact", vessels), &records, |b, r| {
            b.iter(|| compact::compact(black_box(r)))
        });
        g.bench_with_input(BenchmarkId::new("expand", vessels), &compacted, |b, r| {
            b.iter(|| compact::expand(black_box(r)))
        });
    }
    g.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let mut g = c.benchmark_group("pipeline");
    let records = fleet(10, 20);
    let bytes = serde_json::to_vec(&records).unwrap().len() as u64;
    g.throughput(Throughput::Bytes(bytes));

    let mut codecs = vec![("brotli", Codec::Brotli)];
    #[cfg(feature = "zlib-codec")]
    codecs.push(("zlib", Codec::Zlib));

    for (name, codec) in codecs {
        let opts = PipelineOptions {
            codec,
            ..Default::default()
        };
        let wire = pipeline::encode_with_options(&records, KEY, &opts).unwrap();
        g.bench_function(BenchmarkId::new("encode", name), |b| {
            b.iter(|| pipeline::encode_with_options(black_box(&records), KEY, &opts).unwrap())
        });
        g.bench_function(BenchmarkId::new("decode", name), |b| {
            b.iter(|| pipeline::decode_with_options(black_box(&wire), KEY, &opts).unwrap())
        });
    }
    g.finish();
}

criterion_group!(benches, bench_compaction, bench_pipeline);
criterion_main!(benches);
