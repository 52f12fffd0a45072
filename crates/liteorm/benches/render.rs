//! Benchmark statement rendering and cached execution.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use liteorm::{Conditions, Database, DatabaseConfig, OpBag, SelectQb, SqlQb, qb};
use rusqlite::Connection;

/// SELECT * FROM "t" WHERE "col0" = ? AND "col1" >= ? AND "col1" < ? ...
fn build_select(n: usize) -> SelectQb {
    let mut conds = Conditions::new();
    for i in 0..n {
        if i % 2 == 0 {
            conds.insert(format!("col{i}"), i as i64);
        } else {
            conds.insert(format!("col{i}"), OpBag::new().gte(i as i64).lt(i as i64 * 2));
        }
    }
    qb::select("t").and_where(conds).order_by_desc("col0").limit(10)
}

fn bench_to_sql(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/to_sql");

    for n in [1, 5, 10, 50] {
        let query = build_select(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &query, |b, query| {
            b.iter(|| black_box(query.to_sql()));
        });
    }

    group.finish();
}

fn bench_in_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/in_list");

    for n in [5, 20, 100, 500] {
        let values: Vec<i64> = (0..n).collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &values, |b, values| {
            b.iter(|| {
                let query = qb::select("t").and_where(
                    Conditions::new().with("id", OpBag::new().in_list(values.iter().copied())),
                );
                black_box(query.to_sql())
            });
        });
    }

    group.finish();
}

fn bench_statement_cache(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/statement_cache");

    let conn = Connection::open_in_memory().expect("open in-memory database");
    conn.execute_batch(
        "CREATE TABLE t (id INTEGER PRIMARY KEY, v TEXT);
         INSERT INTO t (v) VALUES ('a'), ('b'), ('c');",
    )
    .expect("seed table");

    for (name, config) in [
        ("cached", DatabaseConfig::new()),
        ("uncached", DatabaseConfig::new().no_statement_cache()),
    ] {
        let db = Database::with_config(&conn, config);
        group.bench_function(name, |b| {
            b.iter(|| {
                let rows = qb::select("t")
                    .where_cmp("id", "=", 2)
                    .all(&db)
                    .expect("query");
                black_box(rows)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_to_sql, bench_in_list, bench_statement_cache);
criterion_main!(benches);
