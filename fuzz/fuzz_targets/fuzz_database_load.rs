#![no_main]
use geoblob::{GeoBackend, NativeDb};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Garbage must be rejected or answered, never panic
    if let Ok(db) = NativeDb::from_bytes(data.to_vec()) {
        for ipnum in [0u32, 0x0808_0808, 0x5102_45a0, u32::MAX] {
            let _ = db.record_by_ipnum(ipnum);
        }
    }
});
