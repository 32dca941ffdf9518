#![no_main]
use libfuzzer_sys::{arbitrary::Arbitrary, fuzz_target};
use nstable::{HashTable, NOT_FOUND};
use std::collections::HashMap;

#[derive(Arbitrary, Debug)]
enum Op {
    Add(Vec<u8>, Option<String>, u32),
    Lookup(Vec<u8>, Option<String>),
    Remove(Vec<u8>, Option<String>),
    Clean,
}

#[derive(Arbitrary, Debug)]
struct Input {
    bucket_count: u8,
    ops: Vec<Op>,
}

fuzz_target!(|input: Input| {
    let bucket_count = usize::from(input.bucket_count).max(1);

    let mut table = HashTable::create(bucket_count).unwrap();
    let mut model: HashMap<(Vec<u8>, Option<String>), Vec<u32>> = HashMap::new();

    for op in input.ops {
        match op {
            Op::Add(key, ns, value) => {
                table.add_raw(&key, ns.as_deref(), value).unwrap();
                model.entry((key, ns)).or_default().push(value);
            }
            Op::Lookup(key, ns) => {
                let actual = table.lookup_raw(&key, ns.as_deref());
                let expected = model.get(&(key, ns)).and_then(|v| v.last());
                assert_eq!(expected, actual);
            }
            Op::Remove(key, ns) => {
                let actual = table.remove_raw(&key, ns.as_deref());
                let expected = model.get_mut(&(key, ns)).and_then(Vec::pop);
                assert_eq!(expected, actual);
            }
            Op::Clean => {
                table.clean();
                model.clear();
                assert!(table.is_empty());
            }
        }

        assert_eq!(model.values().map(Vec::len).sum::<usize>(), table.len());
    }

    let mut tagged = nstable::SymbolTable::<()>::create(bucket_count).unwrap();
    for ((key, ns), values) in &model {
        for value in values {
            match tagged.add_uint32_raw(key, ns.as_deref(), *value) {
                Ok(()) => assert_eq!(*value, tagged.lookup_uint32_raw(key, ns.as_deref())),
                Err(_) => assert!(*value >= u32::MAX - 1),
            }
        }
        if values.is_empty() {
            assert_eq!(NOT_FOUND, tagged.lookup_uint32_raw(key, ns.as_deref()));
        }
    }
});
