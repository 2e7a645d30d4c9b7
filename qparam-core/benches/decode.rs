use chrono::{DateTime, FixedOffset};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use qparam_core::{decode, parse_timestamp, QueryRecord, RawValues};
use std::hint::black_box;

#[derive(QueryRecord, Default)]
struct Pagination {
    #[qp("limit")]
    pub limit: u32,
    #[qp("offset")]
    pub offset: u32,
}

#[derive(QueryRecord, Default)]
struct Search {
    #[qp("q")]
    pub query: String,
    #[qp("page")]
    pub page: i32,
    #[qp("tags")]
    pub tags: Vec<String>,
    #[qp("ids")]
    pub ids: Vec<u64>,
    #[qp("active")]
    pub active: Option<bool>,
    #[qp("since")]
    pub since: Option<DateTime<FixedOffset>>,
    pub pagination: Option<Pagination>,
}

fn search_values() -> RawValues {
    RawValues::parse_query(
        "q=rust+query&page=3&tags=a,b,c&tags=d&ids=1,2,3,4,5&active=true\
         &since=2025-07-04T17:12:32+07:00&limit=50&offset=100",
    )
}

fn benchmark_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    let values = search_values();

    group.throughput(Throughput::Elements(1));
    group.bench_function("search_full", |b| {
        b.iter(|| {
            let mut search = Search::default();
            decode(black_box(&values), &mut search).ok();
            black_box(search)
        })
    });

    let empty = RawValues::new();
    group.bench_function("search_empty", |b| {
        b.iter(|| {
            let mut search = Search::default();
            decode(black_box(&empty), &mut search).ok();
            black_box(search)
        })
    });

    for count in [1usize, 16, 256] {
        let ids = (0..count).map(|i| i.to_string()).collect::<Vec<_>>().join(",");
        let values: RawValues = [("ids", ids)].into_iter().collect();
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("sequence_u64", count), &values, |b, values| {
            b.iter(|| {
                let mut search = Search::default();
                decode(black_box(values), &mut search).ok();
                black_box(search)
            })
        });
    }

    group.finish();
}

fn benchmark_timestamps(c: &mut Criterion) {
    let mut group = c.benchmark_group("timestamp");

    let literals = [
        ("rfc3339", "2025-07-04T17:12:32Z"),
        ("space_offset", "2025-07-04T17:12:32 07:00"),
        ("naive", "2025-07-04 17:12:32.123"),
        ("date_only", "2025-07-04"),
        ("time_only", "17:12:32"),
        ("invalid", "not a date"),
    ];

    for (name, literal) in literals {
        group.bench_with_input(BenchmarkId::new("parse", name), literal, |b, literal| {
            b.iter(|| black_box(parse_timestamp(black_box(literal))).ok())
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_decode, benchmark_timestamps);
criterion_main!(benches);
