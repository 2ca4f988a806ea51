use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use weather_history::models::Observation;
use weather_history::processors::AggregateComputer;
use weather_history::readers::RecordParser;

// Create test data for benchmarking
fn create_observations(location_count: usize, days: usize) -> Vec<Observation> {
    let base_date = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
    let mut observations = Vec::with_capacity(location_count * days);

    for location in 0..location_count {
        for day in 0..days {
            let date = base_date + chrono::Duration::days(day as i64);
            // Every 50th reading is missing
            let max_temp = if day % 50 == 0 { -9999 } else { (150 + day % 200) as i16 };

            observations.push(Observation::new(
                format!("USC{:08}", location),
                date,
                max_temp,
                (day % 120) as i16 - 40,
                (day % 30) as i16,
            ));
        }
    }

    observations
}

fn create_lines(days: usize) -> Vec<String> {
    let base_date = NaiveDate::from_ymd_opt(1985, 1, 1).unwrap();
    (0..days)
        .map(|day| {
            let date = base_date + chrono::Duration::days(day as i64);
            format!("{}\t{}\t{}\t{}", date.format("%Y%m%d"), 100 + day % 50, -20, day % 7)
        })
        .collect()
}

fn benchmark_record_parser(c: &mut Criterion) {
    let lines = create_lines(3650);
    let parser = RecordParser::new("USC00110072");

    c.bench_function("parse_3650_lines", |b| {
        b.iter(|| {
            for (i, line) in lines.iter().enumerate() {
                black_box(parser.parse_line(i + 1, line).unwrap());
            }
        })
    });
}

fn benchmark_aggregation(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate_computer");

    for location_count in [10, 100].iter() {
        let observations = create_observations(*location_count, 3650);
        let computer = AggregateComputer::new();

        group.bench_with_input(
            BenchmarkId::new("locations", location_count),
            &observations,
            |b, observations| b.iter(|| black_box(computer.compute(observations.iter()))),
        );
    }

    group.finish();
}

criterion_group!(benches, benchmark_record_parser, benchmark_aggregation);
criterion_main!(benches);
