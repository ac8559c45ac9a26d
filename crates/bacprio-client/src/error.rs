use bacprio_core::types::{AbortReason, ErrorClass, ErrorCode, RejectReason};
use bacprio_datalink::DataLinkError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("datalink error: {0}")]
    DataLink(#[from] DataLinkError),
    #[error("encode error: {0}")]
    Encode(#[from] bacprio_core::EncodeError),
    #[error("decode error: {0}")]
    Decode(#[from] bacprio_core::DecodeError),
    #[error("request timed out")]
    Timeout,
    #[error("request cancelled")]
    Cancelled,
    #[error("all 256 invoke IDs are in use")]
    InvokeIdsExhausted,
    #[error(
        "remote service error for service choice {service_choice}: class {error_class_raw}, code {error_code_raw}"
    )]
    RemoteServiceError {
        service_choice: u8,
        error_class_raw: u32,
        error_code_raw: u32,
        error_class: Option<ErrorClass>,
        error_code: Option<ErrorCode>,
    },
    #[error("remote reject: {}", RejectReason::from_u8(*reason))]
    RemoteReject { reason: u8 },
    #[error("remote abort: {} (server={server})", AbortReason::from_u8(*reason))]
    RemoteAbort { reason: u8, server: bool },
    #[error("unexpected response for this request")]
    UnexpectedResponse,
}

impl ClientError {
    pub(crate) fn remote_service_error(service_choice: u8, class: u32, code: u32) -> Self {
        Self::RemoteServiceError {
            service_choice,
            error_class_raw: class,
            error_code_raw: code,
            error_class: ErrorClass::from_u32(class),
            error_code: ErrorCode::from_u32(code),
        }
    }

    /// Whether the device answered, as opposed to a local or transport failure.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::RemoteServiceError { .. } | Self::RemoteReject { .. } | Self::RemoteAbort { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::ClientError;
    use bacprio_core::types::{ErrorClass, ErrorCode};

    #[test]
    fn remote_service_error_maps_known_enumerations() {
        let err = ClientError::remote_service_error(0x0F, 2, 40);
        match err {
            ClientError::RemoteServiceError {
                error_class,
                error_code,
                ..
            } => {
                assert_eq!(error_class, Some(ErrorClass::Property));
                assert_eq!(error_code, Some(ErrorCode::WriteAccessDenied));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(ClientError::remote_service_error(0x0F, 2, 40).is_remote());
        assert!(!ClientError::Timeout.is_remote());
    }

    #[test]
    fn reject_and_abort_render_reasons() {
        assert_eq!(
            ClientError::RemoteReject { reason: 9 }.to_string(),
            "remote reject: UnrecognizedService"
        );
        assert_eq!(
            ClientError::RemoteAbort {
                reason: 4,
                server: true
            }
            .to_string(),
            "remote abort: SegmentationNotSupported (server=true)"
        );
    }
}
