#![no_main]
use libfuzzer_sys::{
    arbitrary::{Arbitrary, Unstructured},
    fuzz_target,
};
use nstable::strutils::{memmem, strlcat, strlcpy};

fuzz_target!(|data: &[u8]| {
    let mut unstructured = Unstructured::new(data);

    let Ok(capacity) = <u8 as Arbitrary>::arbitrary(&mut unstructured) else {
        return;
    };
    let Ok(src) = <Vec<u8> as Arbitrary>::arbitrary(&mut unstructured) else {
        return;
    };

    let src_len = src.iter().position(|&b| b == 0).unwrap_or(src.len());

    let mut dst = vec![0xAA; usize::from(capacity)];
    assert_eq!(src_len, strlcpy(&mut dst, &src));

    if !dst.is_empty() {
        let copied = src_len.min(dst.len() - 1);
        assert_eq!(&src[..copied], &dst[..copied]);
        assert_eq!(0, dst[copied]);

        let total = strlcat(&mut dst, &src);
        assert_eq!(copied + src_len, total);
        assert!(dst.contains(&0));
    }

    if let Some(pos) = memmem(&src, data) {
        assert_eq!(&src[pos..pos + data.len()], data);
    }
});
