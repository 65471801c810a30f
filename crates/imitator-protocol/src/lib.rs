//! # Imitator Protocol
//!
//! 遥操作控制器的数据模型与线上消息格式（无设备依赖）
//!
//! ## 模块
//!
//! - `pose`: 位置、姿态、位姿类型（人手采样 / 机械臂目标）
//! - `dof`: 笛卡尔控制链自由度掩码
//! - `message`: 位姿话题的 JSON 消息格式
//!
//! ## 坐标约定
//!
//! 所有长度单位为米，姿态分两种表示：
//! - 人手采样使用四元数 `(x, y, z, w)`
//! - 机械臂笛卡尔控制器使用轴角 `(x, y, z, angle)`

pub mod dof;
pub mod message;
pub mod pose;

// 重新导出常用类型
pub use dof::{DofMask, TorsoAxis};
pub use message::PoseMessage;
pub use pose::{AxisAngle, CartesianPose, PoseSample, Position3D, Quaternion, TargetPose};

use thiserror::Error;

/// 协议层错误类型
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// JSON 解码失败
    #[error("Malformed pose message: {0}")]
    Malformed(#[from] serde_json::Error),

    /// 字段包含 NaN / Inf
    #[error("Non-finite value in field '{field}'")]
    NonFinite { field: &'static str },
}
