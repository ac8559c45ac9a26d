use bacprio_core::encoding::writer::Writer;
use bacprio_core::services::ReadPropertyAck;
use bacprio_core::types::{DataValue, ObjectId, ObjectType, PropertyId};
use bacprio_datalink::{DataLink, DataLinkAddress, DataLinkError};
use tokio::sync::{mpsc, Mutex};

type Frame = (DataLinkAddress, Vec<u8>);

/// In-memory data link. Frames sent by the client surface at the paired
/// [`MockPeer`]; frames the peer replies with are returned by `recv`.
#[derive(Debug)]
pub(crate) struct MockDataLink {
    sent: mpsc::UnboundedSender<Frame>,
    inbound: Mutex<mpsc::UnboundedReceiver<Frame>>,
}

#[derive(Debug)]
pub(crate) struct MockPeer {
    sent: mpsc::UnboundedReceiver<Frame>,
    inbound: mpsc::UnboundedSender<Frame>,
}

pub(crate) fn mock_pair() -> (MockDataLink, MockPeer) {
    let (sent_tx, sent_rx) = mpsc::unbounded_channel();
    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
    (
        MockDataLink {
            sent: sent_tx,
            inbound: Mutex::new(inbound_rx),
        },
        MockPeer {
            sent: sent_rx,
            inbound: inbound_tx,
        },
    )
}

impl DataLink for MockDataLink {
    async fn send(&self, address: DataLinkAddress, payload: &[u8]) -> Result<(), DataLinkError> {
        self.sent
            .send((address, payload.to_vec()))
            .map_err(|_| DataLinkError::Io(std::io::Error::other("mock peer dropped")))
    }

    async fn recv(&self, buf: &mut [u8]) -> Result<(usize, DataLinkAddress), DataLinkError> {
        let mut inbound = self.inbound.lock().await;
        let Some((address, payload)) = inbound.recv().await else {
            return std::future::pending().await;
        };
        if payload.len() > buf.len() {
            return Err(DataLinkError::FrameTooLarge);
        }
        buf[..payload.len()].copy_from_slice(&payload);
        Ok((payload.len(), address))
    }
}

impl MockPeer {
    /// Next APDU the client sent, NPDU header stripped.
    pub(crate) async fn next_sent(&mut self) -> (DataLinkAddress, Vec<u8>) {
        let (address, frame) = self.sent.recv().await.expect("client side dropped");
        assert_eq!(&frame[..2], &[0x01, 0x00], "unexpected NPDU header");
        (address, frame[2..].to_vec())
    }

    /// Every APDU sent so far that has not been taken yet.
    pub(crate) fn drain_sent(&mut self) -> Vec<(DataLinkAddress, Vec<u8>)> {
        let mut out = Vec::new();
        while let Ok((address, frame)) = self.sent.try_recv() {
            out.push((address, frame[2..].to_vec()));
        }
        out
    }

    pub(crate) fn reply(&self, apdu: Vec<u8>, from: DataLinkAddress) {
        let mut frame = vec![0x01, 0x00];
        frame.extend_from_slice(&apdu);
        self.inbound.send((from, frame)).expect("client side dropped");
    }
}

/// ComplexACK for a ReadProperty of analog-output:1 present-value.
pub(crate) fn read_property_ack(invoke_id: u8, value: f32) -> Vec<u8> {
    let mut buf = [0u8; 64];
    let mut w = Writer::new(&mut buf);
    ReadPropertyAck {
        object_id: ObjectId::new(ObjectType::AnalogOutput, 1),
        property_id: PropertyId::PresentValue,
        array_index: None,
        value: DataValue::Real(value),
    }
    .encode(&mut w, invoke_id)
    .unwrap();
    w.as_written().to_vec()
}
