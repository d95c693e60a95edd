#![no_main]
use geoblob::address;
use geoblob::host::Term;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < 32 {
        return;
    }

    let mut components = [0i64; 4];
    for (i, chunk) in data[..32].chunks_exact(8).enumerate() {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(chunk);
        components[i] = i64::from_le_bytes(bytes);
    }

    let packed = address::pack_components(components);
    let term = Term::compound("ip", components.iter().map(|&c| Term::Integer(c)).collect());
    let decoded = address::decode(&term);

    // Both entry points agree on every input
    match (packed, decoded) {
        (Ok(a), Ok(Some(b))) => assert_eq!(a, b),
        (Err(a), Err(b)) => assert_eq!(a, b),
        (a, b) => panic!("disagreement: {:?} vs {:?}", a, b),
    }
});
