//! Per-call UDP endpoints and the two exchange shapes built on them.
//!
//! Every exchange opens its own [`Endpoint`] and releases it when the call
//! resolves, whichever way it resolves.

use crate::core::cmds::Command;
use crate::core::frame::{self, Frame, FrameError, MAX_DATAGRAM_SIZE};
use crate::core::DeviceAddress;
use crate::ClientError;
use std::future;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::time::{self, Instant};
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;

/// A UDP socket scoped to a single exchange with one target.
#[derive(Debug)]
pub(crate) struct Endpoint {
    socket: UdpSocket,
    target: SocketAddr,
}

impl Endpoint {
    pub(crate) async fn open(
        bind_ip: IpAddr,
        target: SocketAddr,
        broadcast: bool,
    ) -> Result<Self, ClientError> {
        let bind_addr = SocketAddr::new(bind_ip, 0); // Use ephemeral port
        let socket = UdpSocket::bind(bind_addr).await?;
        if broadcast {
            socket.set_broadcast(true)?;
        }
        tracing::trace!("Opened endpoint {:?} for {target}", socket.local_addr());
        Ok(Endpoint { socket, target })
    }

    pub(crate) async fn send(&self, bytes: &[u8]) -> Result<(), ClientError> {
        self.socket.send_to(bytes, self.target).await?;
        Ok(())
    }

    pub(crate) async fn recv(&self, buf: &mut [u8]) -> Result<usize, ClientError> {
        let (len, src) = self.socket.recv_from(buf).await?;
        tracing::debug!("Received {len} bytes from {src}");
        Ok(len)
    }

    /// Send a frame, logging what went out.
    pub(crate) async fn send_frame(
        &self,
        address: DeviceAddress,
        command: Command,
        payload: &[u8],
    ) -> Result<(), ClientError> {
        let bytes = frame::encode(address, command, payload);
        tracing::debug!(
            "Sending {command} to {} ({address}), {} bytes",
            self.target,
            bytes.len()
        );
        self.send(&bytes).await
    }
}

impl Drop for Endpoint {
    fn drop(&mut self) {
        tracing::trace!("Released endpoint for {}", self.target);
    }
}

/// One command sent and the single reply it is answered with.
#[derive(Debug, Clone)]
pub struct Request<'a> {
    pub command: Command,
    pub payload: &'a [u8],
    /// Treat the first payload byte as data rather than a status code.
    pub skip_status_check: bool,
    /// Keep listening through one BUSY reply for the final one. The timeout
    /// starts over when the BUSY reply arrives.
    pub wait_after_busy: bool,
    /// Overrides the client's default timeout.
    pub timeout: Option<Duration>,
}

impl<'a> Request<'a> {
    /// A command whose reply leads with a status byte.
    pub fn new(command: Command, payload: &'a [u8]) -> Self {
        Request {
            command,
            payload,
            skip_status_check: false,
            wait_after_busy: false,
            timeout: None,
        }
    }

    /// A query whose reply is data.
    pub fn get(command: Command, payload: &'a [u8]) -> Self {
        Request {
            skip_status_check: true,
            ..Request::new(command, payload)
        }
    }

    pub fn wait_after_busy(mut self) -> Self {
        self.wait_after_busy = true;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Await the reply to `request` on an endpoint the request was already sent on.
pub(crate) async fn await_reply(
    endpoint: &Endpoint,
    request: &Request<'_>,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<Frame, ClientError> {
    let mut deadline = Instant::now() + timeout;
    let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
    let mut busy_seen = false;
    loop {
        let len = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ClientError::Cancelled),
            res = endpoint.recv(&mut buf) => res?,
            _ = time::sleep_until(deadline) => {
                tracing::warn!("No reply to {} within {timeout:?}", request.command);
                return Err(ClientError::Timeout(timeout));
            }
        };
        // After a busy reply the final one is a status update, not the original answer shape.
        let skip_status_check = request.skip_status_check || busy_seen;
        match frame::decode(&buf[..len], request.command, skip_status_check) {
            Ok(frame) => return Ok(frame),
            Err(err) if err.is_busy() && request.wait_after_busy && !busy_seen => {
                tracing::debug!("Unit busy on {}, awaiting final reply", request.command);
                busy_seen = true;
                deadline = Instant::now() + timeout;
            }
            Err(err) => {
                tracing::warn!("Reply to {} failed: {err}", request.command);
                return Err(err.into());
            }
        }
    }
}

/// One command answered by an open-ended sequence of frames.
#[derive(Debug, Clone)]
pub struct Collect<'a> {
    pub command: Command,
    pub payload: &'a [u8],
    /// Other command pairs the unit may interleave with the replies.
    pub also_accept: Vec<Command>,
    pub timeout: Duration,
    /// Send an address-only datagram on this interval while waiting.
    pub keepalive: Option<Duration>,
    /// End the exchange at the success sentinel.
    pub until_sentinel: bool,
}

impl<'a> Collect<'a> {
    pub fn new(command: Command, payload: &'a [u8], timeout: Duration) -> Self {
        Collect {
            command,
            payload,
            also_accept: Vec::new(),
            timeout,
            keepalive: None,
            until_sentinel: true,
        }
    }

    pub fn with_keepalive(mut self, interval: Duration) -> Self {
        self.keepalive = Some(interval);
        self
    }

    pub fn also_accept(mut self, command: Command) -> Self {
        self.also_accept.push(command);
        self
    }

    /// Keep collecting past the sentinel until the timeout.
    pub fn through_sentinel(mut self) -> Self {
        self.until_sentinel = false;
        self
    }
}

/// Frames gathered by a completed collector exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collected {
    /// Data frames in arrival order, sentinel excluded.
    pub frames: Vec<Frame>,
    /// Whether the exchange ended at the sentinel rather than the timeout.
    pub sentinel_seen: bool,
}

impl Collected {
    /// Decode the records of every non-empty data frame, in arrival order.
    pub fn decode_each<T, E>(
        &self,
        mut decode: impl FnMut(&[u8]) -> Result<Vec<T>, E>,
    ) -> Result<Vec<T>, E> {
        let mut records = Vec::new();
        for frame in self.frames.iter().filter(|f| !f.payload.is_empty()) {
            records.extend(decode(&frame.payload)?);
        }
        Ok(records)
    }
}

/// Stream of inbound frames of a collector exchange.
pub type FrameStream = ReceiverStream<Result<Frame, ClientError>>;

pub(crate) struct CollectorTask {
    pub endpoint: Endpoint,
    pub address: DeviceAddress,
    pub accepted: Vec<Command>,
    pub timeout: Duration,
    pub keepalive: Option<Duration>,
    pub until_sentinel: bool,
    pub cancel: CancellationToken,
}

/// Receive frames on a task of their own, yielding them in arrival order.
///
/// The stream yields the sentinel frame (when `until_sentinel` is set) and
/// then ends. It also ends at the timeout, after a failure item, or once the
/// receiver is dropped. The endpoint is released when the task ends.
pub(crate) fn spawn_collector(task: CollectorTask) -> FrameStream {
    let (tx, rx) = mpsc::channel(32);
    tokio::spawn(async move {
        let CollectorTask {
            endpoint,
            address,
            accepted,
            timeout,
            keepalive,
            until_sentinel,
            cancel,
        } = task;
        let deadline = Instant::now() + timeout;
        let mut keepalive = keepalive.map(|period| time::interval_at(Instant::now() + period, period));
        let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
        loop {
            let tick = async {
                match keepalive.as_mut() {
                    Some(interval) => interval.tick().await,
                    None => future::pending().await,
                }
            };
            let received = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    let _ = tx.send(Err(ClientError::Cancelled)).await;
                    break;
                }
                _ = tx.closed() => {
                    tracing::debug!("Collector receiver dropped");
                    break;
                }
                _ = time::sleep_until(deadline) => {
                    tracing::debug!("Collector for {address} timed out after {timeout:?}");
                    break;
                }
                _ = tick => {
                    tracing::trace!("Sending keepalive for {address}");
                    if let Err(err) = endpoint.send(&frame::keepalive(address)).await {
                        let _ = tx.send(Err(err)).await;
                        break;
                    }
                    continue;
                }
                res = endpoint.recv(&mut buf) => res,
            };
            let len = match received {
                Ok(len) => len,
                Err(err) => {
                    let _ = tx.send(Err(err)).await;
                    break;
                }
            };
            let frame = match frame::decode_any(&buf[..len], &accepted, true) {
                Ok(frame) => frame,
                Err(err @ (FrameError::FrameTooShort { .. } | FrameError::UnexpectedCommand { .. })) => {
                    tracing::warn!("Discarding datagram: {err}");
                    continue;
                }
                Err(err) => {
                    tracing::warn!("Collector failed: {err}");
                    let _ = tx.send(Err(err.into())).await;
                    break;
                }
            };
            let done = until_sentinel && frame.is_sentinel();
            if tx.send(Ok(frame)).await.is_err() || done {
                break;
            }
        }
        tracing::debug!("Closing collector stream");
    });
    ReceiverStream::new(rx)
}
