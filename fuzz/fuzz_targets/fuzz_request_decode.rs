#![no_main]

use bacprio_core::encoding::writer::Writer;
use bacprio_core::services::ConfirmedServiceRequest;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Whatever decodes must encode again.
    if let Ok(request) = ConfirmedServiceRequest::decode(data) {
        let mut buf = [0u8; 1600];
        let mut w = Writer::new(&mut buf);
        let _ = request.encode(&mut w);
    }
});
