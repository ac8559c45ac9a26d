//! Matching of inbound responses to outstanding confirmed requests.
//!
//! A [`Correlator`] owns one receive task reading from its [`DataLink`]. Each
//! request reserves an invoke ID in the pending table, is sent (and re-sent on
//! timeout) by the future awaiting it, and is resolved by the receive task
//! through a oneshot slot. Whoever removes the table entry decides the outcome:
//! the receive task on a matching response, the waiting future on retry
//! exhaustion, [`Correlator::cancel`], or the future being dropped.

use crate::{ClientError, Response};
use bacprio_core::apdu::{peek_invoke_id, ApduType, ResponsePdu};
use bacprio_core::encoding::writer::Writer;
use bacprio_core::services::ConfirmedServiceRequest;
use bacprio_core::{DecodeError, EncodeError};
use bacprio_datalink::bip::transport::MAX_BIP_FRAME_LEN;
use bacprio_datalink::{DataLink, DataLinkAddress, DataLinkError};
use log::{debug, warn};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{timeout, Instant};

const INVOKE_ID_COUNT: usize = 256;
const IO_ERROR_BACKOFF: Duration = Duration::from_millis(10);

type ResultSlot = oneshot::Sender<Result<Response, ClientError>>;

#[derive(Debug)]
struct PendingExchange {
    serial: u64,
    destination: DataLinkAddress,
    service_choice: u8,
    sent_at: Option<Instant>,
    retry_count: u32,
    result_slot: ResultSlot,
}

#[derive(Debug, Default)]
struct PendingTable {
    exchanges: HashMap<u8, PendingExchange>,
    next_invoke_id: u8,
    next_serial: u64,
}

impl PendingTable {
    /// Next free invoke ID at or after the cursor, wrapping.
    fn allocate(&mut self) -> Option<u8> {
        if self.exchanges.len() >= INVOKE_ID_COUNT {
            return None;
        }
        for _ in 0..INVOKE_ID_COUNT {
            let id = self.next_invoke_id;
            self.next_invoke_id = id.wrapping_add(1);
            if !self.exchanges.contains_key(&id) {
                return Some(id);
            }
        }
        None
    }

    fn remove_if_serial(&mut self, invoke_id: u8, serial: u64) -> Option<PendingExchange> {
        match self.exchanges.get(&invoke_id) {
            Some(exchange) if exchange.serial == serial => self.exchanges.remove(&invoke_id),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Shared<D> {
    datalink: D,
    pending: Mutex<PendingTable>,
    send_lock: tokio::sync::Mutex<()>,
}

impl<D: DataLink> Shared<D> {
    fn table(&self) -> std::sync::MutexGuard<'_, PendingTable> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Removes the exchange a response answers, if source and service agree.
    fn take_matching(
        &self,
        invoke_id: u8,
        source: DataLinkAddress,
        service_choice: Option<u8>,
    ) -> Option<PendingExchange> {
        let mut table = self.table();
        let exchange = table.exchanges.get(&invoke_id)?;
        if exchange.destination != source {
            debug!(
                "response for invoke id {invoke_id} from {source}, expected {}",
                exchange.destination
            );
            return None;
        }
        if service_choice.is_some_and(|sc| sc != exchange.service_choice) {
            debug!(
                "response for invoke id {invoke_id} names service {service_choice:?}, expected {}",
                exchange.service_choice
            );
            return None;
        }
        table.exchanges.remove(&invoke_id)
    }

    fn dispatch(&self, apdu: &[u8], source: DataLinkAddress) {
        if !ApduType::of(apdu).is_some_and(ApduType::is_response) {
            debug!("ignoring non-response apdu from {source}");
            return;
        }
        let Ok(invoke_id) = peek_invoke_id(apdu) else {
            debug!("ignoring truncated apdu from {source}");
            return;
        };

        let (service_choice, outcome) = match ResponsePdu::decode(apdu) {
            Ok(pdu) => (pdu.service_choice(), Ok(Response::from_pdu(pdu))),
            // A service this client never requests cannot answer one of its exchanges.
            Err(DecodeError::UnsupportedService(sc)) => {
                debug!("ignoring response for unsupported service {sc} from {source}");
                return;
            }
            Err(err) => (None, Err(ClientError::Decode(err))),
        };

        let Some(exchange) = self.take_matching(invoke_id, source, service_choice) else {
            debug!("unmatched or duplicate response for invoke id {invoke_id} from {source}");
            return;
        };
        if let Some(sent_at) = exchange.sent_at {
            debug!(
                "invoke id {invoke_id} answered after {:?} ({} retries)",
                sent_at.elapsed(),
                exchange.retry_count
            );
        }
        // The waiter may have been dropped in the meantime; nothing to deliver then.
        let _ = exchange.result_slot.send(outcome);
    }
}

async fn receive_loop<D: DataLink>(shared: Arc<Shared<D>>) {
    let mut buf = [0u8; MAX_BIP_FRAME_LEN];
    loop {
        match shared.datalink.recv_apdu(&mut buf).await {
            Ok((n, source)) => shared.dispatch(&buf[..n], source),
            Err(DataLinkError::Io(err)) => {
                warn!("receive error: {err}");
                tokio::time::sleep(IO_ERROR_BACKOFF).await;
            }
            Err(err) => debug!("dropping inbound frame: {err}"),
        }
    }
}

/// Invoke-ID bookkeeping plus the task that resolves pending requests.
///
/// Must be created inside a Tokio runtime. Dropping it stops the receive task.
#[derive(Debug)]
pub struct Correlator<D: DataLink + 'static> {
    shared: Arc<Shared<D>>,
    receive_task: JoinHandle<()>,
}

impl<D: DataLink + 'static> Correlator<D> {
    pub fn new(datalink: D) -> Self {
        let shared = Arc::new(Shared {
            datalink,
            pending: Mutex::new(PendingTable::default()),
            send_lock: tokio::sync::Mutex::new(()),
        });
        let receive_task = tokio::spawn(receive_loop(Arc::clone(&shared)));
        Self {
            shared,
            receive_task,
        }
    }

    pub fn datalink(&self) -> &D {
        &self.shared.datalink
    }

    /// Reserves an invoke ID for `request` and encodes it.
    ///
    /// Nothing is sent until [`PendingRequest::wait`]. Encoding failures, such as
    /// an out-of-range priority, release the ID again.
    pub fn start(
        &self,
        destination: DataLinkAddress,
        mut request: ConfirmedServiceRequest<'_>,
        response_timeout: Duration,
        max_retries: u32,
    ) -> Result<PendingRequest<'_, D>, ClientError> {
        let (result_slot, rx) = oneshot::channel();
        let (invoke_id, serial) = {
            let mut table = self.shared.table();
            let invoke_id = table.allocate().ok_or(ClientError::InvokeIdsExhausted)?;
            let serial = table.next_serial;
            table.next_serial += 1;
            table.exchanges.insert(
                invoke_id,
                PendingExchange {
                    serial,
                    destination,
                    service_choice: request.service_choice(),
                    sent_at: None,
                    retry_count: 0,
                    result_slot,
                },
            );
            (invoke_id, serial)
        };
        let mut pending = PendingRequest {
            shared: &self.shared,
            invoke_id,
            serial,
            destination,
            apdu: Vec::new(),
            rx,
            response_timeout,
            max_retries,
        };

        request.set_invoke_id(invoke_id);
        pending.apdu = encode_with_growth(|w| request.encode(w))?;
        Ok(pending)
    }

    /// Sends `request` and waits for its outcome, retrying on timeout.
    pub async fn submit(
        &self,
        destination: DataLinkAddress,
        request: ConfirmedServiceRequest<'_>,
        response_timeout: Duration,
        max_retries: u32,
    ) -> Result<Response, ClientError> {
        self.start(destination, request, response_timeout, max_retries)?
            .wait()
            .await
    }

    /// Abandons a pending request. Its waiter resolves with [`ClientError::Cancelled`].
    pub fn cancel(&self, invoke_id: u8) -> bool {
        self.shared.table().exchanges.remove(&invoke_id).is_some()
    }

    pub fn pending_count(&self) -> usize {
        self.shared.table().exchanges.len()
    }
}

impl<D: DataLink + 'static> Drop for Correlator<D> {
    fn drop(&mut self) {
        self.receive_task.abort();
    }
}

fn encode_with_growth<F>(mut encode: F) -> Result<Vec<u8>, ClientError>
where
    F: FnMut(&mut Writer<'_>) -> Result<(), EncodeError>,
{
    for size in [64usize, 256, 1024, MAX_BIP_FRAME_LEN] {
        let mut buf = vec![0u8; size];
        let mut w = Writer::new(&mut buf);
        match encode(&mut w) {
            Ok(()) => {
                let written_len = w.position();
                buf.truncate(written_len);
                return Ok(buf);
            }
            Err(EncodeError::BufferTooSmall) => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Err(EncodeError::BufferTooSmall.into())
}

enum Expiry {
    Retry,
    TimedOut,
    /// The receive task already took the exchange and is delivering it.
    Resolving,
}

/// A request holding an invoke ID. Dropping it releases the ID.
#[derive(Debug)]
pub struct PendingRequest<'c, D> {
    shared: &'c Shared<D>,
    invoke_id: u8,
    serial: u64,
    destination: DataLinkAddress,
    apdu: Vec<u8>,
    rx: oneshot::Receiver<Result<Response, ClientError>>,
    response_timeout: Duration,
    max_retries: u32,
}

impl<D: DataLink> PendingRequest<'_, D> {
    pub fn invoke_id(&self) -> u8 {
        self.invoke_id
    }

    /// The encoded APDU, identical on every attempt.
    pub fn apdu(&self) -> &[u8] {
        &self.apdu
    }

    /// Sends the request and waits for its outcome.
    ///
    /// Retries re-send the same bytes under the same invoke ID. Once retries
    /// run out the result is [`Response::Timeout`]; a response that arrives
    /// while the last timer fires still wins.
    pub async fn wait(mut self) -> Result<Response, ClientError> {
        let mut attempt = 0u32;
        loop {
            if !self.transmit(attempt).await? {
                return (&mut self.rx).await.unwrap_or(Err(ClientError::Cancelled));
            }
            let outcome = timeout(self.response_timeout, &mut self.rx).await;
            match outcome {
                Ok(delivered) => return delivered.unwrap_or(Err(ClientError::Cancelled)),
                Err(_) => match self.on_expiry(attempt) {
                    Expiry::Retry => {
                        attempt += 1;
                        debug!(
                            "invoke id {} to {}: no response, retry {attempt}/{}",
                            self.invoke_id, self.destination, self.max_retries
                        );
                    }
                    Expiry::TimedOut => {
                        warn!(
                            "invoke id {} to {}: timed out after {} attempts",
                            self.invoke_id,
                            self.destination,
                            attempt + 1
                        );
                        return Ok(Response::Timeout);
                    }
                    Expiry::Resolving => {
                        return (&mut self.rx).await.unwrap_or(Err(ClientError::Cancelled));
                    }
                },
            }
        }
    }

    /// Returns `false` without sending when the exchange is already gone:
    /// either answered while waiting for the send lock, or cancelled.
    async fn transmit(&self, attempt: u32) -> Result<bool, ClientError> {
        let _guard = self.shared.send_lock.lock().await;
        {
            let mut table = self.shared.table();
            match table.exchanges.get_mut(&self.invoke_id) {
                Some(exchange) if exchange.serial == self.serial => {
                    exchange.sent_at = Some(Instant::now());
                    exchange.retry_count = attempt;
                }
                _ => return Ok(false),
            }
        }
        self.shared
            .datalink
            .send_apdu(self.destination, &self.apdu)
            .await?;
        Ok(true)
    }

    fn on_expiry(&self, attempt: u32) -> Expiry {
        let mut table = self.shared.table();
        let present = table
            .exchanges
            .get(&self.invoke_id)
            .is_some_and(|exchange| exchange.serial == self.serial);
        if !present {
            Expiry::Resolving
        } else if attempt < self.max_retries {
            Expiry::Retry
        } else {
            table.exchanges.remove(&self.invoke_id);
            Expiry::TimedOut
        }
    }
}

impl<D> Drop for PendingRequest<'_, D> {
    fn drop(&mut self) {
        let mut table = self.shared.pending.lock().unwrap_or_else(PoisonError::into_inner);
        table.remove_if_serial(self.invoke_id, self.serial);
    }
}
