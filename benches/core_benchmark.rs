use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{seq::SliceRandom, thread_rng, Rng};
use std::collections::HashMap;
use travel_booking_core::normalizer::{normalize, SearchDomain};
use travel_booking_core::pricing::{compute_totals, BookingLineItem};

// Benchmarks for the two pure hot paths: every page view normalizes
// its query string, and every booking-panel change recomputes totals.

pub fn normalizer_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_normalization");

    let alias_keys = [
        "cityId", "city", "location", "checkIn", "check_in", "from", "checkOut", "check_out",
        "to", "guests", "guestCount", "pax", "rooms", "roomCount", "utm_source", "ref",
    ];

    for param_count in [2usize, 8, 16].iter() {
        let mut rng = thread_rng();
        let raw: HashMap<String, String> = (0..*param_count)
            .map(|_| {
                let key = alias_keys.choose(&mut rng).unwrap().to_string();
                let value = format!("value-{}", rng.gen::<u16>());
                (key, value)
            })
            .collect();

        group.bench_with_input(
            BenchmarkId::from_parameter(param_count),
            &raw,
            |b, raw| {
                b.iter(|| black_box(normalize(raw, SearchDomain::Hotels)));
            },
        );
    }

    group.finish();
}

pub fn pricing_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("booking_totals");

    for line_count in [1usize, 5, 25].iter() {
        let mut rng = thread_rng();
        let items: Vec<BookingLineItem> = (0..*line_count)
            .map(|_| BookingLineItem {
                unit_price: rng.gen_range(500.0..10_000.0),
                count: rng.gen_range(1..=5),
                tax_rate_percent: if rng.gen_bool(0.5) {
                    Some(rng.gen_range(5.0..28.0))
                } else {
                    None
                },
            })
            .collect();

        group.bench_with_input(
            BenchmarkId::from_parameter(line_count),
            &items,
            |b, items| {
                b.iter(|| black_box(compute_totals(items, 3)));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, normalizer_benchmark, pricing_benchmark);
criterion_main!(benches);
