//! 位姿类型
//!
//! 提供人手采样（`PoseSample`）、机械臂目标（`TargetPose`）与设备反馈
//! （`CartesianPose`）的表示。
//!
//! # 示例
//!
//! ```rust
//! use imitator_protocol::{PoseSample, Position3D, Quaternion};
//!
//! let sample = PoseSample::new(Position3D::new(0.20, 0.10, 0.05), Quaternion::IDENTITY);
//! assert_eq!(sample.position.x, 0.20);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// 三维位置向量（米）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position3D {
    /// X 坐标（米）
    pub x: f64,
    /// Y 坐标（米）
    pub y: f64,
    /// Z 坐标（米）
    pub z: f64,
}

impl Position3D {
    /// 创建新的三维位置
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Position3D { x, y, z }
    }

    /// 零向量
    pub const ZERO: Self = Position3D::new(0.0, 0.0, 0.0);

    /// 按比例缩放
    pub fn scaled(&self, factor: f64) -> Self {
        Position3D {
            x: self.x * factor,
            y: self.y * factor,
            z: self.z * factor,
        }
    }

    /// 计算向量长度（范数）
    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// 到另一点的距离
    pub fn distance(&self, other: &Position3D) -> f64 {
        Position3D::new(self.x - other.x, self.y - other.y, self.z - other.z).norm()
    }

    /// 三个分量是否均为有限值
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// 以 `[x, y, z]` 形式返回
    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

impl fmt::Display for Position3D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3} {:.3} {:.3}", self.x, self.y, self.z)
    }
}

/// 四元数（人手采样的姿态）
///
/// 字段顺序与位姿话题保持一致：`(x, y, z, w)`。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    /// 虚部 i
    pub x: f64,
    /// 虚部 j
    pub y: f64,
    /// 虚部 k
    pub z: f64,
    /// 实部
    pub w: f64,
}

impl Quaternion {
    /// 单位四元数（无旋转）
    pub const IDENTITY: Self = Quaternion {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    /// 创建四元数
    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Quaternion { x, y, z, w }
    }

    /// 四个分量是否均为有限值
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite() && self.w.is_finite()
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Quaternion::IDENTITY
    }
}

impl fmt::Display for Quaternion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Q({:.3}, {:.3}, {:.3}, {:.3})",
            self.x, self.y, self.z, self.w
        )
    }
}

/// 轴角姿态（笛卡尔控制器约定）
///
/// `(x, y, z)` 为旋转轴，`angle` 为旋转角（弧度）。
/// 全零向量表示不请求任何姿态（角度为 0，即无旋转）。
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AxisAngle {
    /// 旋转轴 X 分量
    pub x: f64,
    /// 旋转轴 Y 分量
    pub y: f64,
    /// 旋转轴 Z 分量
    pub z: f64,
    /// 旋转角（弧度）
    pub angle: f64,
}

impl AxisAngle {
    /// 全零轴角
    pub const ZERO: Self = AxisAngle {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        angle: 0.0,
    };

    /// 创建轴角
    pub const fn new(x: f64, y: f64, z: f64, angle: f64) -> Self {
        AxisAngle { x, y, z, angle }
    }

    /// 是否为全零
    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0 && self.angle == 0.0
    }
}

impl fmt::Display for AxisAngle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.3} {:.3} {:.3} {:.3}",
            self.x, self.y, self.z, self.angle
        )
    }
}

/// 笛卡尔空间位姿（设备反馈）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CartesianPose {
    /// 位置（米）
    pub position: Position3D,
    /// 姿态（轴角）
    pub orientation: AxisAngle,
}

impl CartesianPose {
    /// 从位置和轴角创建
    pub const fn new(position: Position3D, orientation: AxisAngle) -> Self {
        CartesianPose {
            position,
            orientation,
        }
    }
}

impl fmt::Display for CartesianPose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pos: {} | ori: {}", self.position, self.orientation)
    }
}

/// 人手位姿采样
///
/// 由位姿话题产生，读取后不可变；下一条采样到来即被取代。
/// 姿态随采样一起传输，但映射中不使用。
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PoseSample {
    /// 手掌位置（米）
    pub position: Position3D,
    /// 手掌姿态
    pub orientation: Quaternion,
}

impl PoseSample {
    /// 创建采样
    pub const fn new(position: Position3D, orientation: Quaternion) -> Self {
        PoseSample {
            position,
            orientation,
        }
    }

    /// 仅位置的采样（姿态为单位四元数）
    pub const fn at(x: f64, y: f64, z: f64) -> Self {
        PoseSample::new(Position3D::new(x, y, z), Quaternion::IDENTITY)
    }
}

/// 机械臂末端目标位姿
///
/// 每个控制周期由映射器新建，立即发送给笛卡尔控制器，不做保留。
/// 姿态跟踪被禁用：构造函数总是写入全零轴角。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetPose {
    position: Position3D,
    orientation: AxisAngle,
}

impl TargetPose {
    /// 以给定位置创建目标（姿态固定为零）
    pub const fn from_position(position: Position3D) -> Self {
        TargetPose {
            position,
            orientation: AxisAngle::ZERO,
        }
    }

    /// 目标位置（米）
    pub fn position(&self) -> Position3D {
        self.position
    }

    /// 目标姿态（总是全零）
    pub fn orientation(&self) -> AxisAngle {
        self.orientation
    }
}

impl fmt::Display for TargetPose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.position)
    }
}
