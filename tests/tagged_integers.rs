use nstable::{Config, Error, Payload, SymbolTable, NOT_FOUND};
use rand::{rngs::StdRng, Rng, SeedableRng};
use test_log::test;

#[test]
fn tagged_random_roundtrip() -> nstable::Result<()> {
    let mut rng = StdRng::seed_from_u64(42);
    let mut table: SymbolTable = Config::new(128).create()?;

    let values = (0..1_000)
        .map(|_| rng.random_range(0..=u32::MAX - 2))
        .collect::<Vec<_>>();

    for (idx, value) in values.iter().enumerate() {
        table.add_uint32_raw(&idx.to_le_bytes(), Some("ints"), *value)?;
    }

    for (idx, value) in values.iter().enumerate() {
        assert_eq!(*value, table.lookup_uint32_raw(&idx.to_le_bytes(), Some("ints")));
        assert_eq!(NOT_FOUND, table.lookup_uint32_raw(&idx.to_le_bytes(), None));
    }

    Ok(())
}

#[test]
fn tagged_domain_edges() -> nstable::Result<()> {
    let mut table: SymbolTable = Config::new(16).create()?;

    table.add_uint32("min", None, 0)?;
    table.add_uint32("max", None, u32::MAX - 2)?;

    assert_eq!(0, table.lookup_uint32("min", None));
    assert_eq!(u32::MAX - 2, table.lookup_uint32("max", None));

    for reserved in [u32::MAX - 1, u32::MAX] {
        assert_eq!(
            Err(Error::InvalidArgument),
            table.add_uint32("reserved", None, reserved)
        );
    }

    assert_eq!(2, table.len());
    assert_eq!(NOT_FOUND, table.lookup_uint32("reserved", None));

    Ok(())
}

#[test]
fn tagged_remove_returns_payload() -> nstable::Result<()> {
    let mut table: SymbolTable = Config::new(16).create()?;
    table.add_uint32("n", Some("ns"), 17)?;

    assert_eq!(Some(Payload::Uint32(17)), table.remove("n", Some("ns")));
    assert_eq!(NOT_FOUND, table.lookup_uint32("n", Some("ns")));

    Ok(())
}
