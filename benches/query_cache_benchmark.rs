use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use holiday_explorer::model::Holiday;
use holiday_explorer::view::{HolidayQueryCache, QueryData, QueryKey};
use std::sync::Arc;
use tokio::runtime::Runtime;

// Benchmark for the query cache read paths

fn populated_cache(rt: &Runtime, entries: usize) -> Arc<HolidayQueryCache> {
    let cache = Arc::new(HolidayQueryCache::new());
    rt.block_on(async {
        for i in 0..entries {
            let key = QueryKey::Holidays {
                country: format!("C{i:03}"),
            };
            let holidays = vec![Holiday::new(
                format!("h-{i}"),
                "2025-12-25",
                "Christmas Day",
            )];
            cache.fetch(key.clone(), move || async move {
                Ok(QueryData::Holidays(holidays))
            });
            cache.settled(&key).await;
        }
    });
    cache
}

pub fn query_cache_benchmark(c: &mut Criterion) {
    let rt = Runtime::new().expect("tokio runtime");
    let mut group = c.benchmark_group("holiday_query_cache");

    // Benchmark with different numbers of cached keys
    for entries in [10, 100, 1000].iter() {
        let cache = populated_cache(&rt, *entries);
        let key = QueryKey::Holidays {
            country: "C000".to_string(),
        };

        group.bench_with_input(
            BenchmarkId::new("state_lookup", entries),
            entries,
            |b, _| {
                b.iter(|| black_box(cache.state(&key)));
            },
        );

        // The cached-hit path of `fetch` never invokes the closure.
        group.bench_with_input(
            BenchmarkId::new("fetch_cached_hit", entries),
            entries,
            |b, _| {
                b.iter(|| {
                    cache.fetch(key.clone(), || async { Ok(QueryData::Holidays(Vec::new())) });
                    black_box(cache.state(&key).status)
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, query_cache_benchmark);
criterion_main!(benches);
