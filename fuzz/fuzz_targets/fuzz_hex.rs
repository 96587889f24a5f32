#![no_main]

use libfuzzer_sys::fuzz_target;

use mv_fastboot::hex;

fuzz_target!(|data: &[u8]| {
    if data.len() > 8 {
        return;
    }

    let Some(n) = hex::parse_hex(data) else {
        return;
    };

    let mut dst = [0u8; 10];
    let len = hex::format_dec(&mut dst, n);
    assert!(len <= dst.len());
});
