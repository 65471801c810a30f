//! 位姿话题消息
//!
//! 每个数据报携带一个 JSON 对象：
//!
//! ```json
//! {
//!   "topic": "/icub/jointPose",
//!   "position": {"x": 0.2, "y": 0.1, "z": 0.05},
//!   "orientation": {"x": 0.0, "y": 0.0, "z": 0.0, "w": 1.0}
//! }
//! ```

use crate::ProtocolError;
use crate::pose::{PoseSample, Position3D, Quaternion};
use serde::{Deserialize, Serialize};

/// 位姿话题上的一条消息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseMessage {
    /// 话题名
    pub topic: String,
    /// 位置
    pub position: Position3D,
    /// 姿态（缺省为单位四元数）
    #[serde(default)]
    pub orientation: Quaternion,
}

impl PoseMessage {
    /// 从采样构造消息
    pub fn new(topic: impl Into<String>, sample: PoseSample) -> Self {
        PoseMessage {
            topic: topic.into(),
            position: sample.position,
            orientation: sample.orientation,
        }
    }

    /// 解码 JSON 字节
    ///
    /// # Errors
    /// - `ProtocolError::Malformed`: JSON 格式或字段不合法
    /// - `ProtocolError::NonFinite`: 位置或姿态含 NaN / Inf
    pub fn decode(bytes: &[u8]) -> Result<Self, ProtocolError> {
        let message: PoseMessage = serde_json::from_slice(bytes)?;
        if !message.position.is_finite() {
            return Err(ProtocolError::NonFinite { field: "position" });
        }
        if !message.orientation.is_finite() {
            return Err(ProtocolError::NonFinite {
                field: "orientation",
            });
        }
        Ok(message)
    }

    /// 编码为 JSON 字节
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// 提取采样
    pub fn sample(&self) -> PoseSample {
        PoseSample::new(self.position, self.orientation)
    }
}
