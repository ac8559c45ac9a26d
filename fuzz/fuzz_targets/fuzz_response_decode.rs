#![no_main]

use bacprio_core::apdu::ResponsePdu;
use bacprio_core::npdu::split_apdu;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = ResponsePdu::decode(data);
    if let Ok((_, apdu)) = split_apdu(data) {
        let _ = ResponsePdu::decode(apdu);
    }
});
