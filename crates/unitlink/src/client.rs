use crate::config::ClientConfig;
use crate::core::frame::Frame;
use crate::core::general::{self, UnitInfo};
use crate::core::{cmds, DeviceAddress};
use crate::transport::{self, Collect, Collected, CollectorTask, Endpoint, FrameStream, Request};
use crate::ClientError;
use futures::StreamExt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// A client for sending commands to one unit.
///
/// The client holds no socket. Each call opens a fresh endpoint and releases
/// it before returning, so a `Client` is cheap to clone and share between
/// tasks. Calls against the same unit are not serialised; units may reject
/// overlapping commands.
#[derive(Clone, Debug)]
pub struct Client {
    target_ip: IpAddr,
    address: DeviceAddress,
    config: ClientConfig,
    cancel: CancellationToken,
}

impl Client {
    /// Create a client for the unit at `target_ip` with the given device address.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use unitlink::core::DeviceAddress;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let address: DeviceAddress = "0.0.1.1".parse()?;
    ///     let client = unitlink::Client::new([192, 168, 1, 40].into(), address);
    ///
    ///     let info = client.info().await?;
    ///     println!("Firmware {}", info.firmware_version());
    ///
    ///     // Switch group 12 to 80%.
    ///     client.set_level(12, 80).await?;
    ///     Ok(())
    /// }
    /// ```
    pub fn new(target_ip: IpAddr, address: DeviceAddress) -> Self {
        Client {
            target_ip,
            address,
            config: ClientConfig::default(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Cancelling `token` aborts any call in flight with [`ClientError::Cancelled`].
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn target(&self) -> SocketAddr {
        SocketAddr::new(self.target_ip, self.config.port)
    }

    pub fn address(&self) -> DeviceAddress {
        self.address
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    async fn open(&self) -> Result<Endpoint, ClientError> {
        if self.cancel.is_cancelled() {
            return Err(ClientError::Cancelled);
        }
        Endpoint::open(self.config.bind_ip, self.target(), false).await
    }

    /// Send one command and wait for its reply.
    ///
    /// Fails with [`ClientError::Timeout`] when nothing matching arrives in
    /// time. When `request.wait_after_busy` is set, one BUSY reply is
    /// tolerated and the following reply is returned instead.
    #[tracing::instrument(skip(self, request), fields(target = %self.target(), command = %request.command))]
    pub async fn request(&self, request: Request<'_>) -> Result<Frame, ClientError> {
        let endpoint = self.open().await?;
        endpoint
            .send_frame(self.address, request.command, request.payload)
            .await?;
        let timeout = request.timeout.unwrap_or(self.config.timeout);
        transport::await_reply(&endpoint, &request, timeout, &self.cancel).await
    }

    /// Send one command and stream every frame answering it.
    ///
    /// Datagrams that are too short or answer another command are logged and
    /// skipped. A device error ends the stream with a failure item.
    #[tracing::instrument(skip(self, collect), fields(target = %self.target(), command = %collect.command))]
    pub async fn stream(&self, collect: Collect<'_>) -> Result<FrameStream, ClientError> {
        let endpoint = self.open().await?;
        endpoint
            .send_frame(self.address, collect.command, collect.payload)
            .await?;
        let mut accepted = vec![collect.command];
        accepted.extend(collect.also_accept);
        Ok(transport::spawn_collector(CollectorTask {
            endpoint,
            address: self.address,
            accepted,
            timeout: collect.timeout,
            keepalive: collect.keepalive,
            until_sentinel: collect.until_sentinel,
            cancel: self.cancel.clone(),
        }))
    }

    /// Send one command and gather its data frames until the sentinel.
    ///
    /// Reaching the timeout is not an error: whatever arrived is returned
    /// with `sentinel_seen` unset.
    pub async fn collect(&self, collect: Collect<'_>) -> Result<Collected, ClientError> {
        let until_sentinel = collect.until_sentinel;
        let mut frames = self.stream(collect).await?;
        let mut collected = Collected::default();
        while let Some(frame) = frames.next().await {
            let frame = frame?;
            if until_sentinel && frame.is_sentinel() {
                collected.sentinel_seen = true;
                break;
            }
            collected.frames.push(frame);
        }
        tracing::debug!(
            "Collected {} frames, sentinel seen: {}",
            collected.frames.len(),
            collected.sentinel_seen
        );
        Ok(collected)
    }

    /// A GET-all exchange with the default timeout.
    pub(crate) async fn collect_all(&self, command: cmds::Command) -> Result<Collected, ClientError> {
        let collected = self
            .collect(Collect::new(command, &[], self.config.timeout))
            .await?;
        if !collected.sentinel_seen {
            tracing::warn!("No sentinel for {command}, returning partial result");
        }
        Ok(collected)
    }

    /// Send a command without waiting for a reply, keeping the endpoint open
    /// for `linger` so the datagram can leave.
    pub(crate) async fn send_only(
        &self,
        command: cmds::Command,
        payload: &[u8],
        linger: Duration,
    ) -> Result<(), ClientError> {
        let endpoint = self.open().await?;
        endpoint.send_frame(self.address, command, payload).await?;
        tokio::time::sleep(linger).await;
        Ok(())
    }

    /// Sleep for `duration`, waking early with [`ClientError::Cancelled`].
    pub(crate) async fn pause(&self, duration: Duration) -> Result<(), ClientError> {
        tokio::select! {
            _ = self.cancel.cancelled() => Err(ClientError::Cancelled),
            _ = tokio::time::sleep(duration) => Ok(()),
        }
    }

    /// Read the unit's identity and network settings.
    #[tracing::instrument(skip(self))]
    pub async fn info(&self) -> Result<UnitInfo, ClientError> {
        let frame = self
            .request(Request::get(cmds::general::GET_INFO, &[]))
            .await?;
        Ok(UnitInfo::try_from(&frame.payload[..])?)
    }

    /// Read the unit's raw status block.
    #[tracing::instrument(skip(self))]
    pub async fn status(&self) -> Result<Vec<u8>, ClientError> {
        let frame = self
            .request(Request::get(cmds::general::GET_STATUS, &[]))
            .await?;
        Ok(frame.payload)
    }

    #[tracing::instrument(skip(self))]
    pub async fn reboot(&self) -> Result<(), ClientError> {
        self.request(Request::new(cmds::general::REBOOT, &[])).await?;
        Ok(())
    }

    /// Store a display name of at most 32 bytes on the unit.
    #[tracing::instrument(skip(self))]
    pub async fn set_name(&self, name: &str) -> Result<(), ClientError> {
        let payload = general::name_payload(name)?;
        self.request(Request::new(cmds::general::SET_NAME, &payload))
            .await?;
        Ok(())
    }
}
