//! 驱动层模块
//!
//! 本模块定义控制循环依赖的两个外部协作方，并提供可直接运行的适配器：
//! - 位姿话题（`PoseSubscriber` / `PoseSource`）：UDP 数据报、进程内通道
//! - 笛卡尔控制器（`CartesianConnector` / `MotionSink`）：进程内仿真控制器
//! - 网络上下文（`NetworkContext`）：启动时的传输可用性检查
//!
//! # 使用场景
//!
//! 控制层只通过 trait 访问这些协作方，真实设备接入时实现同样的 trait 即可。

pub mod channel;
mod device;
mod error;
mod network;
pub mod sim;
mod source;
pub mod udp;

pub use channel::{ChannelPoseSource, ChannelPoseSubscriber, PoseFeed, pose_channel};
pub use device::{CartesianConnector, DeviceOptions, MotionSink};
pub use error::DriverError;
pub use network::NetworkContext;
pub use sim::{
    MAX_RECORDED_TARGETS, SimConfig, SimHandle, SimSnapshot, SimulatedCartesian, SimulatedConnector,
};
pub use source::{PoseSource, PoseSubscriber};
pub use udp::{MAX_DATAGRAMS_PER_READ, UdpPoseSource, UdpPoseSubscriber};
