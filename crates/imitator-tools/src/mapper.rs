//! # 安全映射
//!
//! 将人手位置采样映射为受工作空间限制的机械臂末端目标。
//!
//! 映射由一组有序规则组成，按顺序匹配、首个命中生效：
//!
//! | # | 条件 | 目标 (x, y, z) |
//! |---|------|----------------|
//! | 1 | `0 < x <= x_max` | `(z, x_max, y)` |
//! | 2 | `x_max <= x < 0` | `(z, x_min, y)` |
//! | 3 | `0 < y <= y_max` | `(z, x, y_max)` |
//! | 4 | `y_min <= y < 0` | `(z, x, y_min)` |
//! | 5 | `0 < z <= z_max` | `(z_max, x, y)` |
//! | 6 | `z_min <= z < 0` | `(z_min, x, y)` |
//! | - | 其余 | `(z, x, y)` |
//!
//! 结果整体乘以缩放系数 `tf`。人手坐标系到机械臂坐标系的轴对应为
//! `z → x, x → y, y → z`。
//!
//! # 示例
//!
//! ```rust
//! use imitator_protocol::PoseSample;
//! use imitator_tools::{SafetyMapper, MappingCase};
//!
//! let mapper = SafetyMapper::default();
//! let (case, target) = mapper.map_with_case(&PoseSample::at(0.20, 0.10, 0.05));
//! assert_eq!(case, MappingCase::ClampXMax);
//! assert!((target.position().y - 0.24).abs() < 1e-12);
//! ```

use crate::limits::WorkspaceLimits;
use imitator_protocol::{PoseSample, Position3D, TargetPose};
use std::fmt;
use thiserror::Error;

/// 默认缩放系数
pub const DEFAULT_SCALE: f64 = 0.60;

/// 映射器构造错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MapperError {
    /// 缩放系数必须为有限正数
    #[error("Invalid scale factor: {0} (must be finite and > 0)")]
    InvalidScale(f64),

    /// 限制不是有限值
    #[error("Non-finite workspace limit on axis {axis}")]
    NonFiniteLimit { axis: &'static str },

    /// 下界不小于上界
    #[error("Inverted workspace limits on axis {axis}: min {min} >= max {max}")]
    InvertedLimits {
        axis: &'static str,
        min: f64,
        max: f64,
    },
}

/// 命中的映射分支
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MappingCase {
    /// X 钳位到上界
    ClampXMax,
    /// X 钳位到下界
    ClampXMin,
    /// Y 钳位到上界
    ClampYMax,
    /// Y 钳位到下界
    ClampYMin,
    /// Z 钳位到上界
    ClampZMax,
    /// Z 钳位到下界
    ClampZMin,
    /// 未命中任何规则，仅缩放
    PassThrough,
}

impl fmt::Display for MappingCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MappingCase::ClampXMax => "clamp x to x_max",
            MappingCase::ClampXMin => "clamp x to x_min",
            MappingCase::ClampYMax => "clamp y to y_max",
            MappingCase::ClampYMin => "clamp y to y_min",
            MappingCase::ClampZMax => "clamp z to z_max",
            MappingCase::ClampZMin => "clamp z to z_min",
            MappingCase::PassThrough => "pass-through",
        };
        f.write_str(name)
    }
}

/// 规则条件：作用于人手坐标系下的原始位置
pub type Predicate = fn(&Position3D, &WorkspaceLimits) -> bool;

/// 规则变换：返回机械臂坐标系下、缩放前的位置
pub type Transform = fn(&Position3D, &WorkspaceLimits) -> Position3D;

/// 一条映射规则
#[derive(Clone, Copy)]
pub struct MappingRule {
    /// 分支标识
    pub case: MappingCase,
    /// 匹配条件
    pub predicate: Predicate,
    /// 位置变换
    pub transform: Transform,
}

impl fmt::Debug for MappingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappingRule").field("case", &self.case).finish()
    }
}

fn x_in_upper(p: &Position3D, l: &WorkspaceLimits) -> bool {
    p.x <= l.x_max && p.x > 0.0
}

// 与 x_max（而非 x_min）比较：x_max > 0 时该条件不可满足，负 x 全部落入后续规则。
// 疑为 `x <= x_min` 的笔误，行为改变前需与机器人操作员确认。
fn x_in_lower(p: &Position3D, l: &WorkspaceLimits) -> bool {
    p.x >= l.x_max && p.x < 0.0
}

fn y_in_upper(p: &Position3D, l: &WorkspaceLimits) -> bool {
    p.y <= l.y_max && p.y > 0.0
}

fn y_in_lower(p: &Position3D, l: &WorkspaceLimits) -> bool {
    p.y >= l.y_min && p.y < 0.0
}

fn z_in_upper(p: &Position3D, l: &WorkspaceLimits) -> bool {
    p.z <= l.z_max && p.z > 0.0
}

fn z_in_lower(p: &Position3D, l: &WorkspaceLimits) -> bool {
    p.z >= l.z_min && p.z < 0.0
}

/// 有序规则表（首个命中生效）
const RULES: [MappingRule; 6] = [
    MappingRule {
        case: MappingCase::ClampXMax,
        predicate: x_in_upper,
        transform: |p, l| Position3D::new(p.z, l.x_max, p.y),
    },
    MappingRule {
        case: MappingCase::ClampXMin,
        predicate: x_in_lower,
        transform: |p, l| Position3D::new(p.z, l.x_min, p.y),
    },
    MappingRule {
        case: MappingCase::ClampYMax,
        predicate: y_in_upper,
        transform: |p, l| Position3D::new(p.z, p.x, l.y_max),
    },
    MappingRule {
        case: MappingCase::ClampYMin,
        predicate: y_in_lower,
        transform: |p, l| Position3D::new(p.z, p.x, l.y_min),
    },
    MappingRule {
        case: MappingCase::ClampZMax,
        predicate: z_in_upper,
        transform: |p, l| Position3D::new(l.z_max, p.x, p.y),
    },
    MappingRule {
        case: MappingCase::ClampZMin,
        predicate: z_in_lower,
        transform: |p, l| Position3D::new(l.z_min, p.x, p.y),
    },
];

/// 默认分支：仅做轴对应
fn pass_through(p: &Position3D) -> Position3D {
    Position3D::new(p.z, p.x, p.y)
}

/// 安全映射器
///
/// 纯函数、无内部状态，可在任意线程共享。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SafetyMapper {
    limits: WorkspaceLimits,
    scale: f64,
}

impl SafetyMapper {
    /// 创建映射器
    ///
    /// # Errors
    /// - `MapperError::InvalidScale`: 缩放系数非有限或不为正
    /// - `MapperError::NonFiniteLimit` / `InvertedLimits`: 限制不合法
    pub fn new(limits: WorkspaceLimits, scale: f64) -> Result<Self, MapperError> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(MapperError::InvalidScale(scale));
        }
        for (axis, min, max) in limits.axes() {
            if !min.is_finite() || !max.is_finite() {
                return Err(MapperError::NonFiniteLimit { axis });
            }
            if min >= max {
                return Err(MapperError::InvertedLimits { axis, min, max });
            }
        }
        Ok(Self { limits, scale })
    }

    /// 工作空间限制
    pub fn limits(&self) -> &WorkspaceLimits {
        &self.limits
    }

    /// 缩放系数
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// 有序规则表
    pub fn rules() -> &'static [MappingRule] {
        &RULES
    }

    /// 判断位置命中的分支
    pub fn classify(&self, position: &Position3D) -> MappingCase {
        RULES
            .iter()
            .find(|rule| (rule.predicate)(position, &self.limits))
            .map_or(MappingCase::PassThrough, |rule| rule.case)
    }

    /// 映射采样，同时返回命中的分支
    pub fn map_with_case(&self, sample: &PoseSample) -> (MappingCase, TargetPose) {
        let position = &sample.position;
        let (case, robot_frame) = match RULES
            .iter()
            .find(|rule| (rule.predicate)(position, &self.limits))
        {
            Some(rule) => (rule.case, (rule.transform)(position, &self.limits)),
            None => (MappingCase::PassThrough, pass_through(position)),
        };

        (
            case,
            TargetPose::from_position(robot_frame.scaled(self.scale)),
        )
    }

    /// 映射采样
    ///
    /// 采样的姿态被忽略，目标姿态总是全零。
    pub fn map(&self, sample: &PoseSample) -> TargetPose {
        self.map_with_case(sample).1
    }
}

impl Default for SafetyMapper {
    fn default() -> Self {
        Self {
            limits: WorkspaceLimits::default(),
            scale: DEFAULT_SCALE,
        }
    }
}
