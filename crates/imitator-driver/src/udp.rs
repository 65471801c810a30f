//! UDP 位姿话题适配器
//!
//! 发布方把 `PoseMessage` 编码为 JSON，每个数据报一条消息。
//! 订阅方使用非阻塞 socket，每次读取时排空接收缓冲区（单次最多
//! [`MAX_DATAGRAMS_PER_READ`] 个数据报），只保留最后一条属于本话题的合法消息。

use crate::error::DriverError;
use crate::source::{PoseSource, PoseSubscriber};
use imitator_protocol::{PoseMessage, PoseSample};
use std::io::ErrorKind;
use std::net::{SocketAddr, UdpSocket};
use tracing::{debug, info, warn};

/// 单个数据报的最大长度
const MAX_DATAGRAM_SIZE: usize = 2048;

/// 单次读取最多处理的数据报数，剩余的留给下一次读取
pub const MAX_DATAGRAMS_PER_READ: usize = 64;

/// UDP 位姿订阅入口
#[derive(Debug, Clone)]
pub struct UdpPoseSubscriber {
    bind_addr: SocketAddr,
    node: String,
}

impl UdpPoseSubscriber {
    /// 创建订阅入口（尚未绑定 socket）
    pub fn new(bind_addr: SocketAddr, node: impl Into<String>) -> Self {
        Self {
            bind_addr,
            node: node.into(),
        }
    }
}

impl PoseSubscriber for UdpPoseSubscriber {
    type Source = UdpPoseSource;

    fn subscribe(&mut self, topic: &str) -> Result<UdpPoseSource, DriverError> {
        let fail = |reason: String| DriverError::SubscriptionFailed {
            topic: topic.to_string(),
            reason,
        };

        let socket = UdpSocket::bind(self.bind_addr)
            .map_err(|e| fail(format!("bind {}: {}", self.bind_addr, e)))?;
        socket
            .set_nonblocking(true)
            .map_err(|e| fail(format!("set_nonblocking: {}", e)))?;

        let local = socket.local_addr().map_err(|e| fail(e.to_string()))?;
        info!("Node {} subscribed to {} on udp://{}", self.node, topic, local);

        Ok(UdpPoseSource {
            socket: Some(socket),
            topic: topic.to_string(),
            buf: vec![0u8; MAX_DATAGRAM_SIZE],
        })
    }
}

/// UDP 位姿数据源
pub struct UdpPoseSource {
    socket: Option<UdpSocket>,
    topic: String,
    buf: Vec<u8>,
}

impl UdpPoseSource {
    /// 实际监听地址（关闭后为 `None`）
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket.as_ref().and_then(|s| s.local_addr().ok())
    }

    /// 订阅的话题
    pub fn topic(&self) -> &str {
        &self.topic
    }
}

/// 接收并解码一个数据报
///
/// 接收缓冲区为空时返回 `Ok(None)`。
fn recv_message(socket: &UdpSocket, buf: &mut [u8]) -> Result<Option<PoseMessage>, DriverError> {
    let len = match socket.recv_from(buf) {
        Ok((len, _)) => len,
        Err(e) if e.kind() == ErrorKind::WouldBlock => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(PoseMessage::decode(&buf[..len])?))
}

impl PoseSource for UdpPoseSource {
    fn try_read(&mut self) -> Option<PoseSample> {
        let socket = self.socket.as_ref()?;
        let mut latest = None;

        for _ in 0..MAX_DATAGRAMS_PER_READ {
            match recv_message(socket, &mut self.buf) {
                Ok(None) => break,
                Ok(Some(msg)) if msg.topic == self.topic => latest = Some(msg.sample()),
                Ok(Some(msg)) => debug!("Ignoring pose for topic {}", msg.topic),
                Err(DriverError::Protocol(e)) => debug!("Dropping malformed datagram: {}", e),
                Err(DriverError::Io(e)) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!("Pose socket receive error: {}", e);
                    break;
                },
            }
        }

        latest
    }

    fn close(&mut self) -> Result<(), DriverError> {
        if self.socket.take().is_some() {
            debug!("Closed pose subscription {}", self.topic);
        }
        Ok(())
    }
}
