#![no_main]

use bacprio_core::encoding::tag::decode_tag;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut offset = 0;
    while let Ok((tag, next)) = decode_tag(data, offset) {
        assert!(next > offset && next <= data.len());
        assert!(tag.value.len() <= next - offset);
        offset = next;
    }
});
