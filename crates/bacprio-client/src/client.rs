use crate::correlator::{Correlator, PendingRequest};
use crate::{ClientConfig, ClientDataValue, ClientError, ReadPropertyResult, Response};
use bacprio_core::encoding::tag::AppTag;
use bacprio_core::services::{
    ConfirmedServiceRequest, ReadPropertyRequest, WritePropertyRequest,
};
use bacprio_core::types::{ObjectId, PropertyId};
use bacprio_core::DecodeError;
use bacprio_datalink::{BacnetIpTransport, DataLink, DataLinkAddress};
use std::time::Duration;

/// ReadProperty / WriteProperty client over any [`DataLink`].
///
/// Requests may be issued concurrently from several tasks; responses are
/// matched by invoke ID.
#[derive(Debug)]
pub struct BacnetClient<D: DataLink + 'static> {
    correlator: Correlator<D>,
    response_timeout: Duration,
    retries: u32,
}

impl BacnetClient<BacnetIpTransport> {
    /// Binds the default BACnet/IP port on all interfaces.
    pub async fn new() -> Result<Self, ClientError> {
        Self::with_config(ClientConfig::default()).await
    }

    pub async fn with_config(config: ClientConfig) -> Result<Self, ClientError> {
        let datalink = BacnetIpTransport::bind(config.bind_addr).await?;
        Ok(Self::with_datalink(datalink)
            .with_response_timeout(config.apdu_timeout)
            .with_retries(config.apdu_retries))
    }
}

impl<D: DataLink + 'static> BacnetClient<D> {
    /// Must be called inside a Tokio runtime; the receive task starts here.
    pub fn with_datalink(datalink: D) -> Self {
        let defaults = ClientConfig::default();
        Self {
            correlator: Correlator::new(datalink),
            response_timeout: defaults.apdu_timeout,
            retries: defaults.apdu_retries,
        }
    }

    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout.max(Duration::from_millis(1));
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn datalink(&self) -> &D {
        self.correlator.datalink()
    }

    /// Reserves an invoke ID and encodes `request` without sending it.
    ///
    /// Useful when the caller needs the invoke ID, e.g. to [`cancel`](Self::cancel).
    pub fn start(
        &self,
        address: DataLinkAddress,
        request: ConfirmedServiceRequest<'_>,
    ) -> Result<PendingRequest<'_, D>, ClientError> {
        self.correlator
            .start(address, request, self.response_timeout, self.retries)
    }

    /// Sends any supported confirmed request and returns the raw outcome.
    pub async fn submit(
        &self,
        address: DataLinkAddress,
        request: ConfirmedServiceRequest<'_>,
    ) -> Result<Response, ClientError> {
        self.start(address, request)?.wait().await
    }

    pub fn cancel(&self, invoke_id: u8) -> bool {
        self.correlator.cancel(invoke_id)
    }

    pub fn pending_requests(&self) -> usize {
        self.correlator.pending_count()
    }

    pub async fn read_property(
        &self,
        address: DataLinkAddress,
        object_id: ObjectId,
        property_id: PropertyId,
    ) -> Result<ClientDataValue, ClientError> {
        self.read_property_full(address, object_id, property_id, None)
            .await
            .map(|result| result.value)
    }

    pub async fn read_property_with_index(
        &self,
        address: DataLinkAddress,
        object_id: ObjectId,
        property_id: PropertyId,
        array_index: u32,
    ) -> Result<ClientDataValue, ClientError> {
        self.read_property_full(address, object_id, property_id, Some(array_index))
            .await
            .map(|result| result.value)
    }

    /// Reads a property and checks that the device answered with `expected`.
    pub async fn read_property_as(
        &self,
        address: DataLinkAddress,
        object_id: ObjectId,
        property_id: PropertyId,
        expected: AppTag,
    ) -> Result<ClientDataValue, ClientError> {
        let value = self.read_property(address, object_id, property_id).await?;
        if value.app_tag() != expected {
            return Err(DecodeError::TypeMismatch.into());
        }
        Ok(value)
    }

    pub async fn read_real(
        &self,
        address: DataLinkAddress,
        object_id: ObjectId,
        property_id: PropertyId,
    ) -> Result<f32, ClientError> {
        let value = self
            .read_property_as(address, object_id, property_id, AppTag::Real)
            .await?;
        value
            .as_real()
            .ok_or(ClientError::Decode(DecodeError::TypeMismatch))
    }

    /// The whole ComplexACK, including the identifiers the device echoed.
    pub async fn read_property_full(
        &self,
        address: DataLinkAddress,
        object_id: ObjectId,
        property_id: PropertyId,
        array_index: Option<u32>,
    ) -> Result<ReadPropertyResult, ClientError> {
        let request = ReadPropertyRequest {
            object_id,
            property_id,
            array_index,
            invoke_id: 0,
        };
        self.submit(address, request.into())
            .await?
            .into_result()?
            .ok_or(ClientError::UnexpectedResponse)
    }

    /// Writes `request`; the invoke ID it carries is replaced.
    pub async fn write_property(
        &self,
        address: DataLinkAddress,
        request: WritePropertyRequest<'_>,
    ) -> Result<(), ClientError> {
        match self.submit(address, request.into()).await?.into_result()? {
            None => Ok(()),
            Some(_) => Err(ClientError::UnexpectedResponse),
        }
    }

    /// Relinquishes `priority` by writing the context-tagged Null.
    pub async fn write_property_null(
        &self,
        address: DataLinkAddress,
        object_id: ObjectId,
        property_id: PropertyId,
        priority: u8,
    ) -> Result<(), ClientError> {
        self.write_property(
            address,
            WritePropertyRequest::relinquish(object_id, property_id, priority),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::BacnetClient;
    use crate::test_support::{mock_pair, read_property_ack, MockDataLink, MockPeer};
    use crate::ClientError;
    use bacprio_core::apdu::{AbortPdu, BacnetError, RejectPdu, SimpleAck};
    use bacprio_core::encoding::tag::AppTag;
    use bacprio_core::encoding::writer::Writer;
    use bacprio_core::services::{ConfirmedServiceRequest, PropertyValue, WritePropertyRequest};
    use bacprio_core::types::{DataValue, ErrorClass, ErrorCode, ObjectId, ObjectType, PropertyId};
    use bacprio_core::{DecodeError, EncodeError};
    use bacprio_datalink::DataLinkAddress;
    use std::time::Duration;

    fn device() -> DataLinkAddress {
        DataLinkAddress::Ip(([192, 168, 1, 20], 47808).into())
    }

    fn ao1() -> ObjectId {
        ObjectId::new(ObjectType::AnalogOutput, 1)
    }

    fn client() -> (BacnetClient<MockDataLink>, MockPeer) {
        let (dl, peer) = mock_pair();
        let client = BacnetClient::with_datalink(dl)
            .with_response_timeout(Duration::from_millis(40))
            .with_retries(0);
        (client, peer)
    }

    fn encoded(encode: impl FnOnce(&mut Writer<'_>)) -> Vec<u8> {
        let mut buf = [0u8; 32];
        let mut w = Writer::new(&mut buf);
        encode(&mut w);
        w.as_written().to_vec()
    }

    /// Answers the next request with whatever `respond` builds from its invoke ID.
    async fn respond_once(peer: &mut MockPeer, respond: impl FnOnce(u8) -> Vec<u8>) -> Vec<u8> {
        let (addr, apdu) = peer.next_sent().await;
        peer.reply(respond(apdu[2]), addr);
        apdu
    }

    #[tokio::test]
    async fn read_property_returns_real() {
        let (client, mut peer) = client();
        let (value, sent) = tokio::join!(
            client.read_real(device(), ao1(), PropertyId::PresentValue),
            respond_once(&mut peer, |id| read_property_ack(id, 72.5))
        );
        assert_eq!(value.unwrap(), 72.5);
        assert_eq!(
            &sent[..2],
            &[0x00, 0x05],
            "unsegmented request, 1476-octet max APDU"
        );
        assert_eq!(&sent[3..], &[0x0C, 0x0C, 0x00, 0x40, 0x00, 0x01, 0x19, 0x55]);
    }

    #[tokio::test]
    async fn read_property_as_rejects_wrong_type() {
        let (client, mut peer) = client();
        let (result, _) = tokio::join!(
            client.read_property_as(device(), ao1(), PropertyId::PresentValue, AppTag::Enumerated),
            respond_once(&mut peer, |id| read_property_ack(id, 72.5))
        );
        assert!(matches!(
            result,
            Err(ClientError::Decode(DecodeError::TypeMismatch))
        ));
    }

    #[tokio::test]
    async fn read_property_with_index_encodes_array_index() {
        let (client, mut peer) = client();
        let (_, sent) = tokio::join!(
            client.read_property_with_index(device(), ao1(), PropertyId::PriorityArray, 8),
            respond_once(&mut peer, |id| read_property_ack(id, 0.0))
        );
        assert_eq!(&sent[3..], &[0x0C, 0x0C, 0x00, 0x40, 0x00, 0x01, 0x19, 0x57, 0x29, 0x08]);
    }

    #[tokio::test]
    async fn write_property_null_sends_relinquish_bytes() {
        let (client, mut peer) = client();
        let (result, sent) = tokio::join!(
            client.write_property_null(device(), ao1(), PropertyId::PresentValue, 2),
            respond_once(&mut peer, |id| encoded(|w| SimpleAck {
                invoke_id: id,
                service_choice: 0x0F
            }
            .encode(w)
            .unwrap()))
        );
        result.unwrap();
        let invoke_id = sent[2];
        assert_eq!(
            sent,
            vec![
                0x00, 0x05, invoke_id, 0x0F, 0x0C, 0x00, 0x40, 0x00, 0x01, 0x19, 0x55, 0x3E, 0x58,
                0x3F, 0x49, 0x02
            ]
        );
    }

    #[tokio::test]
    async fn write_property_real_at_priority() {
        let (client, mut peer) = client();
        let request = WritePropertyRequest {
            object_id: ObjectId::new(ObjectType::AnalogValue, 3),
            value: PropertyValue::Application(DataValue::Real(21.5)),
            priority: Some(8),
            ..Default::default()
        };
        let (result, sent) = tokio::join!(
            client.write_property(device(), request),
            respond_once(&mut peer, |id| encoded(|w| SimpleAck {
                invoke_id: id,
                service_choice: 0x0F
            }
            .encode(w)
            .unwrap()))
        );
        result.unwrap();
        assert_eq!(
            &sent[3..],
            &[
                0x0F, 0x0C, 0x00, 0x80, 0x00, 0x03, 0x19, 0x55, 0x3E, 0x44, 0x41, 0xAC, 0x00, 0x00,
                0x3F, 0x49, 0x08
            ]
        );
    }

    #[tokio::test]
    async fn error_pdu_surfaces_class_and_code() {
        let (client, mut peer) = client();
        let (result, _) = tokio::join!(
            client.write_property_null(device(), ao1(), PropertyId::PresentValue, 2),
            respond_once(&mut peer, |id| encoded(|w| BacnetError {
                invoke_id: id,
                service_choice: 0x0F,
                error_class: 2,
                error_code: 40,
            }
            .encode(w)
            .unwrap()))
        );
        match result.unwrap_err() {
            ClientError::RemoteServiceError {
                service_choice,
                error_class,
                error_code,
                ..
            } => {
                assert_eq!(service_choice, 0x0F);
                assert_eq!(error_class, Some(ErrorClass::Property));
                assert_eq!(error_code, Some(ErrorCode::WriteAccessDenied));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn reject_and_abort_surface_as_errors() {
        let (client, mut peer) = client();
        let (result, _) = tokio::join!(
            client.read_property(device(), ao1(), PropertyId::PresentValue),
            respond_once(&mut peer, |id| encoded(|w| RejectPdu {
                invoke_id: id,
                reason: 9
            }
            .encode(w)
            .unwrap()))
        );
        assert!(matches!(result, Err(ClientError::RemoteReject { reason: 9 })));

        let (result, _) = tokio::join!(
            client.read_property(device(), ao1(), PropertyId::PresentValue),
            respond_once(&mut peer, |id| encoded(|w| AbortPdu {
                server: true,
                invoke_id: id,
                reason: 4
            }
            .encode(w)
            .unwrap()))
        );
        assert!(matches!(
            result,
            Err(ClientError::RemoteAbort {
                reason: 4,
                server: true
            })
        ));
    }

    #[tokio::test]
    async fn silence_times_out_after_every_retry() {
        let (dl, mut peer) = mock_pair();
        let client = BacnetClient::with_datalink(dl)
            .with_response_timeout(Duration::from_millis(30))
            .with_retries(2);
        let result = client
            .read_property(device(), ao1(), PropertyId::PresentValue)
            .await;
        assert!(matches!(result, Err(ClientError::Timeout)));
        assert_eq!(peer.drain_sent().len(), 3);
        assert_eq!(client.pending_requests(), 0);
    }

    #[tokio::test]
    async fn out_of_range_priority_sends_nothing() {
        let (client, mut peer) = client();
        for priority in [0, 17] {
            let result = client
                .write_property_null(device(), ao1(), PropertyId::PresentValue, priority)
                .await;
            assert!(matches!(
                result,
                Err(ClientError::Encode(EncodeError::ValueOutOfRange))
            ));
        }
        assert!(peer.drain_sent().is_empty());
        assert_eq!(client.pending_requests(), 0);
    }

    #[tokio::test]
    async fn started_request_can_be_cancelled() {
        let (client, mut peer) = client();
        let client = client.with_response_timeout(Duration::from_secs(5));
        let request: ConfirmedServiceRequest<'_> = WritePropertyRequest::relinquish(
            ao1(),
            PropertyId::PresentValue,
            2,
        )
        .into();
        let pending = client.start(device(), request).unwrap();
        let invoke_id = pending.invoke_id();
        let canceller = async {
            peer.next_sent().await;
            assert!(client.cancel(invoke_id));
        };
        let (result, ()) = tokio::join!(pending.wait(), canceller);
        assert!(matches!(result, Err(ClientError::Cancelled)));
    }
}
