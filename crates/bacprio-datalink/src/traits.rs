use std::future::Future;

use bacprio_core::encoding::writer::Writer;
use bacprio_core::npdu::{split_apdu, Npdu};
use thiserror::Error;

use crate::DataLinkAddress;

/// Errors that can occur at the data-link layer.
#[derive(Debug, Error)]
pub enum DataLinkError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("frame too large")]
    FrameTooLarge,
    #[error("invalid frame")]
    InvalidFrame,
    #[error("unsupported BVLC function 0x{0:02x}")]
    UnsupportedBvlcFunction(u8),
}

impl DataLinkError {
    /// Whether the error concerns one inbound datagram rather than the socket.
    pub fn is_frame_error(&self) -> bool {
        !matches!(self, Self::Io(_))
    }
}

fn with_local_npdu(apdu: &[u8]) -> Result<Vec<u8>, DataLinkError> {
    let mut frame = vec![0u8; apdu.len() + 2];
    let mut w = Writer::new(&mut frame);
    Npdu::local()
        .encode(&mut w)
        .map_err(|_| DataLinkError::FrameTooLarge)?;
    w.write_all(apdu).map_err(|_| DataLinkError::FrameTooLarge)?;
    Ok(frame)
}

/// Sends and receives network-layer frames.
///
/// The futures are `Send` so a receive loop over any `DataLink` can be spawned
/// onto a multi-threaded runtime. Implementors may write the methods as
/// `async fn`.
pub trait DataLink: Send + Sync {
    /// Sends the NPDU `payload` to `address`.
    fn send(
        &self,
        address: DataLinkAddress,
        payload: &[u8],
    ) -> impl Future<Output = Result<(), DataLinkError>> + Send;

    /// Receives one NPDU into `buf`, returning `(bytes_read, source_address)`.
    fn recv(
        &self,
        buf: &mut [u8],
    ) -> impl Future<Output = Result<(usize, DataLinkAddress), DataLinkError>> + Send;

    /// Prefixes `apdu` with a local NPDU header and sends it.
    fn send_apdu(
        &self,
        address: DataLinkAddress,
        apdu: &[u8],
    ) -> impl Future<Output = Result<(), DataLinkError>> + Send {
        async move {
            let frame = with_local_npdu(apdu)?;
            self.send(address, &frame).await
        }
    }

    /// Receives one frame and moves its APDU to the front of `buf`.
    ///
    /// Network-layer messages and frames without an APDU are
    /// [`DataLinkError::InvalidFrame`].
    fn recv_apdu(
        &self,
        buf: &mut [u8],
    ) -> impl Future<Output = Result<(usize, DataLinkAddress), DataLinkError>> + Send {
        async move {
            let (n, source) = self.recv(buf).await?;
            let (npdu, apdu) = split_apdu(&buf[..n]).map_err(|_| DataLinkError::InvalidFrame)?;
            if npdu.is_network_message() || apdu.is_empty() {
                return Err(DataLinkError::InvalidFrame);
            }
            let start = n - apdu.len();
            buf.copy_within(start..n, 0);
            Ok((n - start, source))
        }
    }
}
