//! # Imitator Tools - 安全映射与配置
//!
//! **依赖原则**: 只依赖 `imitator-protocol`，不依赖任何设备或传输层
//!
//! ## 包含模块
//!
//! - `limits` - 工作空间限制（只读结构）
//! - `mapper` - 人手位置 → 机械臂目标的安全映射（纯函数）
//! - `config` - TOML 配置文件

pub mod config;
pub mod limits;
pub mod mapper;

// 重新导出常用类型
pub use config::{ControlSettings, DeviceSettings, ImitatorConfig, PoseSettings};
pub use limits::WorkspaceLimits;
pub use mapper::{DEFAULT_SCALE, MapperError, MappingCase, MappingRule, SafetyMapper};
