use crate::bip::bvlc::{BvlcFunction, BvlcHeader};
use crate::{DataLink, DataLinkAddress, DataLinkError};
use bacprio_core::encoding::{reader::Reader, writer::Writer};
use log::trace;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tokio::net::UdpSocket;

/// Largest datagram sent or accepted, BVLC header included.
pub const MAX_BIP_FRAME_LEN: usize = 1600;

/// BACnet/IP over one UDP socket (Annex J).
///
/// Cloning shares the socket, so one clone can sit in a receive loop while
/// others send.
#[derive(Debug, Clone)]
pub struct BacnetIpTransport {
    socket: Arc<UdpSocket>,
}

impl BacnetIpTransport {
    pub async fn bind(bind_addr: SocketAddr) -> Result<Self, DataLinkError> {
        let socket = UdpSocket::bind(bind_addr).await?;
        socket.set_broadcast(true)?;
        Ok(Self {
            socket: Arc::new(socket),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, DataLinkError> {
        self.socket.local_addr().map_err(DataLinkError::Io)
    }
}

fn copy_payload(payload: &[u8], buf: &mut [u8]) -> Result<usize, DataLinkError> {
    if payload.len() > buf.len() {
        return Err(DataLinkError::FrameTooLarge);
    }
    buf[..payload.len()].copy_from_slice(payload);
    Ok(payload.len())
}

impl DataLink for BacnetIpTransport {
    async fn send(&self, address: DataLinkAddress, payload: &[u8]) -> Result<(), DataLinkError> {
        let function = if address.is_broadcast() {
            BvlcFunction::OriginalBroadcastNpdu
        } else {
            BvlcFunction::OriginalUnicastNpdu
        };

        let mut frame = [0u8; MAX_BIP_FRAME_LEN];
        let header = BvlcHeader::for_payload(function, payload.len())
            .map_err(|_| DataLinkError::FrameTooLarge)?;
        if usize::from(header.length) > frame.len() {
            return Err(DataLinkError::FrameTooLarge);
        }

        let mut w = Writer::new(&mut frame);
        header
            .encode(&mut w)
            .map_err(|_| DataLinkError::InvalidFrame)?;
        w.write_all(payload)
            .map_err(|_| DataLinkError::FrameTooLarge)?;

        trace!("bip send {} bytes to {address}", w.position());
        self.socket
            .send_to(w.as_written(), address.as_socket_addr())
            .await?;
        Ok(())
    }

    async fn recv(&self, buf: &mut [u8]) -> Result<(usize, DataLinkAddress), DataLinkError> {
        let mut frame = [0u8; MAX_BIP_FRAME_LEN];
        let (n, src) = self.socket.recv_from(&mut frame).await?;
        trace!("bip recv {n} bytes from {src}");
        let mut r = Reader::new(&frame[..n]);
        let hdr = BvlcHeader::decode(&mut r).map_err(|_| DataLinkError::InvalidFrame)?;
        let body = r
            .read_exact(hdr.payload_len())
            .map_err(|_| DataLinkError::InvalidFrame)?;

        match hdr.function {
            BvlcFunction::OriginalUnicastNpdu | BvlcFunction::OriginalBroadcastNpdu => {
                let len = copy_payload(body, buf)?;
                Ok((len, DataLinkAddress::Ip(src)))
            }
            BvlcFunction::ForwardedNpdu => {
                // B/IP address of the originating device precedes the NPDU.
                if body.len() < 6 {
                    return Err(DataLinkError::InvalidFrame);
                }
                let origin_ip = Ipv4Addr::new(body[0], body[1], body[2], body[3]);
                let origin_port = u16::from_be_bytes([body[4], body[5]]);
                let len = copy_payload(&body[6..], buf)?;
                Ok((
                    len,
                    DataLinkAddress::Ip(SocketAddr::new(IpAddr::V4(origin_ip), origin_port)),
                ))
            }
            BvlcFunction::Unknown(v) => Err(DataLinkError::UnsupportedBvlcFunction(v)),
            _ => Err(DataLinkError::InvalidFrame),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::BacnetIpTransport;
    use crate::bip::bvlc::{BvlcFunction, BvlcHeader, BVLC_TYPE_BIP};
    use crate::{DataLink, DataLinkAddress, DataLinkError};
    use bacprio_core::encoding::writer::Writer;
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};
    use tokio::net::UdpSocket;

    fn localhost() -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0)
    }

    async fn pair() -> (BacnetIpTransport, UdpSocket) {
        let transport = BacnetIpTransport::bind(localhost()).await.unwrap();
        let peer = UdpSocket::bind(localhost()).await.unwrap();
        (transport, peer)
    }

    #[tokio::test]
    async fn unicast_send_prefixes_bvlc_and_npdu() {
        let (transport, peer) = pair().await;
        let peer_addr = peer.local_addr().unwrap();

        transport
            .send_apdu(DataLinkAddress::Ip(peer_addr), &[0x20, 0x07, 0x0F])
            .await
            .unwrap();

        let mut rx = [0u8; 64];
        let (n, src) = peer.recv_from(&mut rx).await.unwrap();
        assert_eq!(src, transport.local_addr().unwrap());
        assert_eq!(
            &rx[..n],
            &[0x81, 0x0A, 0x00, 0x09, 0x01, 0x00, 0x20, 0x07, 0x0F]
        );
    }

    #[tokio::test]
    async fn recv_apdu_strips_headers() {
        let (transport, peer) = pair().await;
        let target = transport.local_addr().unwrap();

        peer.send_to(&[0x81, 0x0A, 0x00, 0x09, 0x01, 0x00, 0x20, 0x07, 0x0F], target)
            .await
            .unwrap();

        let mut out = [0u8; 32];
        let (n, src) = transport.recv_apdu(&mut out).await.unwrap();
        assert_eq!(&out[..n], &[0x20, 0x07, 0x0F]);
        assert_eq!(src, DataLinkAddress::Ip(peer.local_addr().unwrap()));
    }

    #[tokio::test]
    async fn recv_apdu_rejects_network_layer_message() {
        let (transport, peer) = pair().await;
        let target = transport.local_addr().unwrap();

        // Who-Is-Router-To-Network.
        peer.send_to(&[0x81, 0x0A, 0x00, 0x07, 0x01, 0x80, 0x00], target)
            .await
            .unwrap();

        let mut out = [0u8; 32];
        let err = transport.recv_apdu(&mut out).await.unwrap_err();
        assert!(matches!(err, DataLinkError::InvalidFrame));
    }

    #[tokio::test]
    async fn truncated_bvlc_length_is_invalid() {
        let (transport, peer) = pair().await;
        let target = transport.local_addr().unwrap();

        // Claims 16 bytes, carries 6.
        peer.send_to(&[0x81, 0x0A, 0x00, 0x10, 0x01, 0x00], target)
            .await
            .unwrap();

        let mut out = [0u8; 32];
        let err = transport.recv(&mut out).await.unwrap_err();
        assert!(matches!(err, DataLinkError::InvalidFrame));
        assert!(err.is_frame_error());
    }

    #[tokio::test]
    async fn recv_forwarded_npdu_returns_forwarded_origin() {
        let (transport, sender) = pair().await;
        let target = transport.local_addr().unwrap();

        let mut frame = [0u8; 64];
        let mut w = Writer::new(&mut frame);
        BvlcHeader::for_payload(BvlcFunction::ForwardedNpdu, 6 + 3)
            .unwrap()
            .encode(&mut w)
            .unwrap();
        w.write_all(&[10, 1, 2, 3]).unwrap();
        w.write_be_u16(47808).unwrap();
        w.write_all(&[1, 2, 3]).unwrap();

        sender.send_to(w.as_written(), target).await.unwrap();

        let mut out = [0u8; 16];
        let (n, src) = transport.recv(&mut out).await.unwrap();
        assert_eq!(n, 3);
        assert_eq!(&out[..3], &[1, 2, 3]);
        assert_eq!(
            src,
            DataLinkAddress::Ip(SocketAddr::new(
                IpAddr::V4(Ipv4Addr::new(10, 1, 2, 3)),
                47808
            ))
        );
    }

    #[tokio::test]
    async fn bbmd_functions_are_not_npdus() {
        let (transport, sender) = pair().await;
        let target = transport.local_addr().unwrap();

        // BVLC-Result, successful completion.
        sender
            .send_to(&[BVLC_TYPE_BIP, 0x00, 0x00, 0x06, 0x00, 0x00], target)
            .await
            .unwrap();

        let mut out = [0u8; 16];
        let err = transport.recv(&mut out).await.unwrap_err();
        assert!(matches!(err, DataLinkError::InvalidFrame));
    }

    #[tokio::test]
    async fn unknown_bvlc_function_errors() {
        let (transport, sender) = pair().await;
        let target = transport.local_addr().unwrap();

        let frame = [BVLC_TYPE_BIP, 0x99, 0x00, 0x04];
        sender.send_to(&frame, target).await.unwrap();

        let mut out = [0u8; 16];
        let err = transport.recv(&mut out).await.unwrap_err();
        assert!(matches!(err, DataLinkError::UnsupportedBvlcFunction(0x99)));
    }

    #[tokio::test]
    async fn oversize_payload_is_refused() {
        let (transport, peer) = pair().await;
        let payload = vec![0u8; super::MAX_BIP_FRAME_LEN];
        let err = transport
            .send(DataLinkAddress::Ip(peer.local_addr().unwrap()), &payload)
            .await
            .unwrap_err();
        assert!(matches!(err, DataLinkError::FrameTooLarge));
    }
}
