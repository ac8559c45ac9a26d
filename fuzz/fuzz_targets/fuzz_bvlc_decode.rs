#![no_main]

use bacprio_core::encoding::reader::Reader;
use bacprio_datalink::bip::bvlc::BvlcHeader;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut r = Reader::new(data);
    if let Ok(header) = BvlcHeader::decode(&mut r) {
        let _ = r.read_exact(header.payload_len());
    }
});
