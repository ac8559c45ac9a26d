use bacprio_core::apdu::{ApduType, ResponsePdu};
use bacprio_core::npdu::split_apdu;
use bacprio_core::services::ConfirmedServiceRequest;
use std::fs;
use std::path::{Path, PathBuf};

fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../..")
        .canonicalize()
        .expect("workspace root should be resolvable")
}

fn parse_hex_fixture(path: &Path) -> Vec<u8> {
    let content = fs::read_to_string(path).expect("fixture must be readable");
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(str::split_whitespace)
        .map(|token| {
            u8::from_str_radix(token, 16)
                .unwrap_or_else(|_| panic!("invalid hex token '{token}' in {}", path.display()))
        })
        .collect()
}

#[test]
fn every_fixture_decodes_as_request_or_response() {
    let fixture_dir = workspace_root().join("fixtures/golden");
    let mut fixture_files = fs::read_dir(&fixture_dir)
        .expect("fixtures directory should exist")
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "hex"))
        .collect::<Vec<_>>();
    fixture_files.sort();
    assert!(
        !fixture_files.is_empty(),
        "expected corpus fixtures in {}",
        fixture_dir.display()
    );

    for fixture in fixture_files {
        let bytes = parse_hex_fixture(&fixture);
        let (npdu, apdu) = split_apdu(&bytes)
            .unwrap_or_else(|e| panic!("fixture {} failed NPDU decode: {e}", fixture.display()));
        assert!(!npdu.is_network_message(), "{}", fixture.display());

        match ApduType::of(apdu) {
            Some(ApduType::ConfirmedRequest) => {
                let req = ConfirmedServiceRequest::decode(apdu).unwrap_or_else(|e| {
                    panic!("fixture {} failed request decode: {e}", fixture.display())
                });
                assert_eq!(req.invoke_id(), apdu[2]);
            }
            Some(kind) if kind.is_response() => {
                let rsp = ResponsePdu::decode(apdu).unwrap_or_else(|e| {
                    panic!("fixture {} failed response decode: {e}", fixture.display())
                });
                assert_eq!(rsp.invoke_id(), apdu[1]);
            }
            other => panic!("fixture {} has unexpected APDU type {other:?}", fixture.display()),
        }
    }
}
