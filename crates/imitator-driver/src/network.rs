//! 网络上下文
//!
//! 进程级的传输层引导：启动时检查网络可用，之后由监督者持有，
//! 并从中创建位姿订阅入口。不使用任何全局状态。

use crate::error::DriverError;
use crate::udp::UdpPoseSubscriber;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use tracing::debug;

/// 网络上下文
#[derive(Debug, Clone)]
pub struct NetworkContext {
    bind_addr: SocketAddr,
    node: String,
}

impl NetworkContext {
    /// 检查网络可用性并创建上下文
    ///
    /// 解析监听地址，并在对应网卡上绑定一个临时端口做探测。
    ///
    /// # Errors
    /// - `DriverError::TransportUnavailable`: 地址无法解析或网卡不可用
    pub fn check(bind_addr: &str, node: impl Into<String>) -> Result<Self, DriverError> {
        let resolved = bind_addr
            .to_socket_addrs()
            .map_err(|e| {
                DriverError::TransportUnavailable(format!("cannot resolve '{}': {}", bind_addr, e))
            })?
            .next()
            .ok_or_else(|| {
                DriverError::TransportUnavailable(format!("'{}' resolves to nothing", bind_addr))
            })?;

        let probe = UdpSocket::bind(SocketAddr::new(resolved.ip(), 0)).map_err(|e| {
            DriverError::TransportUnavailable(format!(
                "no usable interface for {}: {}",
                resolved.ip(),
                e
            ))
        })?;
        debug!(
            "Network probe bound {:?} for pose transport {}",
            probe.local_addr().ok(),
            resolved
        );

        Ok(Self {
            bind_addr: resolved,
            node: node.into(),
        })
    }

    /// 位姿话题监听地址
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    /// 订阅节点名
    pub fn node(&self) -> &str {
        &self.node
    }

    /// 创建位姿订阅入口
    pub fn pose_subscriber(&self) -> UdpPoseSubscriber {
        UdpPoseSubscriber::new(self.bind_addr, self.node.clone())
    }
}
