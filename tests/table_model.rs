use nstable::HashTable;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::collections::HashMap;
use test_log::test;

type Model = HashMap<(Vec<u8>, Option<String>), Vec<u32>>;

const NAMESPACES: [Option<&str>; 4] = [None, Some(""), Some("a"), Some("b")];

fn random_key(rng: &mut impl Rng) -> Vec<u8> {
    let len = rng.random_range(0..4);
    (0..len).map(|_| rng.random_range(b'a'..=b'd')).collect()
}

fn run_model(seed: u64, bucket_count: usize, ops: usize) -> nstable::Result<()> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut table = HashTable::create(bucket_count)?;
    let mut model = Model::new();
    let mut counter = 0u32;

    for _ in 0..ops {
        let key = random_key(&mut rng);
        let ns = NAMESPACES[rng.random_range(0..NAMESPACES.len())];
        let model_key = (key.clone(), ns.map(str::to_string));

        match rng.random_range(0..10) {
            0..=4 => {
                counter += 1;
                table.add_raw(&key, ns, counter)?;
                model.entry(model_key).or_default().push(counter);
            }
            5..=7 => {
                let expected = model.get_mut(&model_key).and_then(Vec::pop);
                assert_eq!(expected, table.remove_raw(&key, ns));
            }
            _ => {
                let expected = model.get(&model_key).and_then(|v| v.last());
                assert_eq!(expected, table.lookup_raw(&key, ns));
            }
        }

        let expected_len: usize = model.values().map(Vec::len).sum();
        assert_eq!(expected_len, table.len());
    }

    for ns in NAMESPACES {
        let mut actual = table.iter(ns).map(|(_, v)| *v).collect::<Vec<_>>();
        let mut expected = model
            .iter()
            .filter(|((_, model_ns), _)| model_ns.as_deref() == ns)
            .flat_map(|(_, values)| values.iter().copied())
            .collect::<Vec<_>>();

        actual.sort_unstable();
        expected.sort_unstable();
        assert_eq!(expected, actual);
    }

    for (key, ns, value) in table.iter_all() {
        assert!(table.bucket_index(key, ns) < bucket_count);
        let values = model
            .get(&(key.to_vec(), ns.map(str::to_string)))
            .expect("entry should exist in model");
        assert!(values.contains(value));
    }

    Ok(())
}

#[test]
fn table_model_small() -> nstable::Result<()> {
    for seed in 0..16 {
        run_model(seed, 3, 500)?;
    }
    Ok(())
}

#[test]
fn table_model_large() -> nstable::Result<()> {
    run_model(0xC0FFEE, 10_007, 5_000)
}

#[test]
fn table_model_single_bucket() -> nstable::Result<()> {
    run_model(7, 1, 1_000)
}
