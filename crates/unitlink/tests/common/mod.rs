//! A scripted stand-in for a unit, bound to the loopback interface.

#![allow(dead_code)]

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;
use unitlink::core::cmds::{Command, ERROR_FLAG};
use unitlink::core::frame::{self, Frame};
use unitlink::core::DeviceAddress;
use unitlink::{Client, ClientConfig};

pub const UNIT: DeviceAddress = DeviceAddress::from_octets([0, 0, 1, 1]);
pub const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// What the unit has seen so far.
#[derive(Debug, Default)]
pub struct Log {
    /// Every decoded frame, in arrival order.
    pub frames: Vec<Frame>,
    /// Address-only keepalive datagrams.
    pub keepalives: usize,
}

/// A fake unit answering each inbound frame with whatever its script returns.
pub struct FakeUnit {
    pub addr: SocketAddr,
    log: Arc<Mutex<Log>>,
    task: JoinHandle<()>,
}

impl FakeUnit {
    /// Spawn a unit whose `script` maps each inbound frame to the datagrams sent back.
    pub async fn spawn<F>(mut script: F) -> FakeUnit
    where
        F: FnMut(&Frame) -> Vec<Vec<u8>> + Send + 'static,
    {
        FakeUnit::spawn_paced(move |frame| {
            script(frame)
                .into_iter()
                .map(|reply| (Duration::ZERO, reply))
                .collect()
        })
        .await
    }

    /// Like [`FakeUnit::spawn`], waiting the paired delay before each datagram.
    pub async fn spawn_paced<F>(mut script: F) -> FakeUnit
    where
        F: FnMut(&Frame) -> Vec<(Duration, Vec<u8>)> + Send + 'static,
    {
        let socket = UdpSocket::bind((LOCALHOST, 0)).await.unwrap();
        let addr = socket.local_addr().unwrap();
        let log = Arc::new(Mutex::new(Log::default()));
        let task_log = log.clone();
        let task = tokio::spawn(async move {
            let mut buf = vec![0u8; frame::MAX_DATAGRAM_SIZE];
            loop {
                let Ok((len, src)) = socket.recv_from(&mut buf).await else {
                    break;
                };
                if len == DeviceAddress::SIZE {
                    task_log.lock().unwrap().keepalives += 1;
                    continue;
                }
                let Ok(frame) = frame::parse(&buf[..len]) else {
                    continue;
                };
                let replies = script(&frame);
                task_log.lock().unwrap().frames.push(frame);
                for (delay, reply) in replies {
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    let _ = socket.send_to(&reply, src).await;
                }
            }
        });
        FakeUnit { addr, log, task }
    }

    /// A unit that never answers.
    pub async fn silent() -> FakeUnit {
        FakeUnit::spawn(|_| Vec::new()).await
    }

    /// A client for this unit with short timings.
    pub fn client(&self) -> Client {
        let config = ClientConfig::default()
            .with_bind_ip(LOCALHOST)
            .with_port(self.addr.port())
            .with_timeout(Duration::from_millis(300));
        Client::new(self.addr.ip(), UNIT).with_config(config)
    }

    /// Commands received so far, in order.
    pub fn commands(&self) -> Vec<Command> {
        self.log
            .lock()
            .unwrap()
            .frames
            .iter()
            .map(|f| f.command)
            .collect()
    }

    pub fn frames(&self) -> Vec<Frame> {
        self.log.lock().unwrap().frames.clone()
    }

    pub fn keepalives(&self) -> usize {
        self.log.lock().unwrap().keepalives
    }
}

impl Drop for FakeUnit {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// A reply to `request` carrying `payload`.
pub fn reply(request: &Frame, payload: &[u8]) -> Vec<u8> {
    frame::encode(request.address, request.command, payload)
}

/// The success acknowledgement, also used as the end-of-data sentinel.
pub fn ok(request: &Frame) -> Vec<u8> {
    reply(request, &[0])
}

/// An error reply carrying `code`.
pub fn error(request: &Frame, code: u8) -> Vec<u8> {
    let command = Command::from_raw(request.command.cmd1 | ERROR_FLAG, request.command.cmd2);
    frame::encode(request.address, command, &[code])
}

/// A frame for another command, as sent unprompted by a unit.
pub fn unsolicited(command: Command, payload: &[u8]) -> Vec<u8> {
    frame::encode(UNIT, command, payload)
}
