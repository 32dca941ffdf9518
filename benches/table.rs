use criterion::{criterion_group, criterion_main, Criterion};
use nstable::{Config, HashTable, SymbolTable};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn random_identifiers(n: usize) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(0);

    (0..n)
        .map(|_| {
            let len = rng.random_range(4..24);
            (0..len)
                .map(|_| char::from(rng.random_range(b'a'..=b'z')))
                .collect()
        })
        .collect()
}

fn table_lookup(c: &mut Criterion) {
    let identifiers = random_identifiers(100_000);

    let mut group = c.benchmark_group("table lookup");

    for bucket_count in [1_009, 10_007, 100_003] {
        let mut table: HashTable<usize> = Config::new(bucket_count).create().unwrap();

        for (idx, ident) in identifiers.iter().enumerate() {
            table.add(ident, Some("default"), idx).unwrap();
        }

        let needle = &identifiers[identifiers.len() / 2];

        group.bench_function(format!("{bucket_count} buckets"), |b| {
            b.iter(|| {
                assert!(table.lookup(needle, Some("default")).is_some());
            });
        });
    }
}

fn table_add_uint32(c: &mut Criterion) {
    let identifiers = random_identifiers(10_000);

    c.bench_function("table add uint32 + clean", |b| {
        let mut table: SymbolTable = Config::default().create().unwrap();

        b.iter(|| {
            for (idx, ident) in identifiers.iter().enumerate() {
                table.add_uint32(ident, None, idx as u32).unwrap();
            }
            table.clean();
        });
    });
}

criterion_group!(benches, table_lookup, table_add_uint32);
criterion_main!(benches);
