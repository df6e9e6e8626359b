use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::json;
use std::hint::black_box;
use stock_service::models::{Holding, HoldingInput, HoldingsSummary};

fn holdings(count: usize) -> Vec<Holding> {
    (0..count)
        .map(|i| Holding {
            id: Some(format!("{:024x}", i)),
            ticker: format!("T{}", i % 500),
            quantity: (i % 97) as f64 + 0.25,
            total_cost: (i as f64) * 13.37 + 0.005,
            account: if i % 3 == 0 { "Roth IRA" } else { "Brokerage" }.to_string(),
        })
        .collect()
}

fn benchmark_summary(c: &mut Criterion) {
    let mut group = c.benchmark_group("holdings_summary");

    for count in [10, 1_000, 100_000] {
        let data = holdings(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &data, |b, data| {
            b.iter(|| HoldingsSummary::from_holdings(black_box(data)))
        });
    }

    group.finish();
}

fn benchmark_decode(c: &mut Criterion) {
    let body = json!({
        "ticker": "AAPL",
        "quantity": 12.5,
        "totalCost": 2250.75,
        "account": "Brokerage",
    });

    c.bench_function("holding_input_for_create", |b| {
        b.iter(|| HoldingInput::for_create(black_box(body.clone())))
    });
}

criterion_group!(benches, benchmark_summary, benchmark_decode);
criterion_main!(benches);
