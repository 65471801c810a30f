//! 控制层模块
//!
//! 提供遥操作控制的核心：
//! - `ControlLoop` - 单周期 感知 → 映射 → 安全钳位 → 下发
//! - `Supervisor` - 生命周期：初始化、按固定周期运行、到期或收到停止信号后关闭
//!
//! # 线程模型
//!
//! 两个控制流：周期工作线程（独占控制循环）与监督线程（只等待截止时间或
//! 停止信号）。停止是协作式的：当前周期执行完毕后才开始关闭。
//!
//! # 示例
//!
//! ```rust,no_run
//! use imitator_control::{ControlLoop, LoopConfig, Supervisor, SupervisorConfig};
//! use imitator_driver::{pose_channel, SimConfig, SimulatedConnector};
//! use imitator_tools::SafetyMapper;
//! use std::time::Duration;
//!
//! let config = LoopConfig::default();
//! let (feed, subscriber) = pose_channel(config.topic.clone());
//! let connector = SimulatedConnector::new(SimConfig::default());
//! let control = ControlLoop::new(connector, subscriber, SafetyMapper::default(), config);
//!
//! let supervisor = Supervisor::new(control, SupervisorConfig {
//!     period: Duration::from_millis(500),
//!     run_time: Duration::from_secs(10),
//! });
//! let report = supervisor.run().unwrap();
//! println!("stopped by {:?} after {} ticks", report.trigger, report.stats.ticks);
//! # drop(feed);
//! ```

mod control_loop;
mod error;
mod state;
mod supervisor;

pub use control_loop::{ControlLoop, LoopConfig};
pub use error::ControlError;
pub use state::{LoopState, LoopStats, TickOutcome};
pub use supervisor::{RunReport, StopHandle, StopTrigger, Supervisor, SupervisorConfig};
