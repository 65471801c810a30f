//! # 配置
//!
//! 控制器的全部可调参数。所有段落都可省略，省略时使用默认值，
//! 因此不带配置文件运行等价于使用内置常量。
//!
//! ```toml
//! [control]
//! period_ms = 500
//! run_time_secs = 3600
//! scale = 0.6
//!
//! [workspace]
//! x_max = 0.4
//! x_min = -0.4
//!
//! [device]
//! remote = "/icubSim/cartesianController/right_arm"
//! local = "/cartesian_client/right_arm"
//! torso_pitch_max_deg = 30.0
//!
//! [pose]
//! topic = "/icub/jointPose"
//! bind_addr = "127.0.0.1:9870"
//! ```

use crate::limits::WorkspaceLimits;
use crate::mapper::{DEFAULT_SCALE, SafetyMapper};
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// 控制器配置
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImitatorConfig {
    /// 控制循环设置
    pub control: ControlSettings,
    /// 工作空间限制
    pub workspace: WorkspaceLimits,
    /// 笛卡尔控制器连接设置
    pub device: DeviceSettings,
    /// 位姿话题设置
    pub pose: PoseSettings,
}

/// 控制循环设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlSettings {
    /// 控制周期（毫秒）
    pub period_ms: u64,
    /// 运行时长（秒），到期后自动停止
    pub run_time_secs: u64,
    /// 人手 → 机械臂的缩放系数
    pub scale: f64,
}

impl ControlSettings {
    /// 控制周期
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }

    /// 运行时长
    pub fn run_time(&self) -> Duration {
        Duration::from_secs(self.run_time_secs)
    }
}

impl Default for ControlSettings {
    fn default() -> Self {
        Self {
            period_ms: 500,
            run_time_secs: 3600,
            scale: DEFAULT_SCALE,
        }
    }
}

/// 笛卡尔控制器连接设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceSettings {
    /// 远端端口（控制器服务）
    pub remote: String,
    /// 本地端口（本客户端）
    pub local: String,
    /// 躯干俯仰上限（度），下限保持控制器原值
    pub torso_pitch_max_deg: f64,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            remote: "/icubSim/cartesianController/right_arm".to_string(),
            local: "/cartesian_client/right_arm".to_string(),
            torso_pitch_max_deg: 30.0,
        }
    }
}

/// 位姿话题设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoseSettings {
    /// 话题名
    pub topic: String,
    /// 订阅节点名
    pub node: String,
    /// UDP 监听地址
    pub bind_addr: String,
}

impl Default for PoseSettings {
    fn default() -> Self {
        Self {
            topic: "/icub/jointPose".to_string(),
            node: "/icubSim/poseSub".to_string(),
            bind_addr: "127.0.0.1:9870".to_string(),
        }
    }
}

impl ImitatorConfig {
    /// 从 TOML 字符串解析并校验
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ImitatorConfig = toml::from_str(content).context("解析 TOML 配置失败")?;
        config.validate()?;
        Ok(config)
    }

    /// 从文件加载配置
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败: {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("配置文件无效: {}", path.display()))
    }

    /// 序列化为 TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("序列化配置失败")
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = self.to_toml_string()?;
        fs::write(path.as_ref(), content)
            .with_context(|| format!("写入配置文件失败: {}", path.as_ref().display()))
    }

    /// 校验配置
    pub fn validate(&self) -> Result<()> {
        if self.control.period_ms == 0 {
            bail!("control.period_ms must be > 0");
        }
        if self.control.run_time_secs == 0 {
            bail!("control.run_time_secs must be > 0");
        }
        if !self.device.torso_pitch_max_deg.is_finite() {
            bail!("device.torso_pitch_max_deg must be finite");
        }
        if self.pose.topic.is_empty() {
            bail!("pose.topic must not be empty");
        }
        self.mapper()?;
        Ok(())
    }

    /// 按配置构造映射器
    pub fn mapper(&self) -> Result<SafetyMapper> {
        Ok(SafetyMapper::new(self.workspace, self.control.scale)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ImitatorConfig::default();
        assert_eq!(config.control.period(), Duration::from_millis(500));
        assert_eq!(config.control.run_time(), Duration::from_secs(3600));
        assert_eq!(config.control.scale, 0.60);
        assert_eq!(config.device.torso_pitch_max_deg, 30.0);
        assert_eq!(config.pose.topic, "/icub/jointPose");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config = ImitatorConfig::from_toml_str(
            r#"
[control]
period_ms = 100

[workspace]
x_max = 0.3
x_min = -0.3
"#,
        )
        .unwrap();

        assert_eq!(config.control.period_ms, 100);
        assert_eq!(config.control.run_time_secs, 3600);
        assert_eq!(config.workspace.x_max, 0.3);
        assert_eq!(config.workspace.y_max, 0.5);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = ImitatorConfig::from_toml_str("").unwrap();
        assert_eq!(config, ImitatorConfig::default());
    }

    #[test]
    fn test_rejects_invalid() {
        assert!(ImitatorConfig::from_toml_str("[control]\nperiod_ms = 0\n").is_err());
        assert!(ImitatorConfig::from_toml_str("[control]\nrun_time_secs = 0\n").is_err());
        assert!(ImitatorConfig::from_toml_str("[control]\nscale = -1.0\n").is_err());
        assert!(ImitatorConfig::from_toml_str("[workspace]\nz_min = 1.0\n").is_err());
        assert!(ImitatorConfig::from_toml_str("[pose]\ntopic = \"\"\n").is_err());
        assert!(ImitatorConfig::from_toml_str("control = 3").is_err());
    }

    #[test]
    fn test_toml_string_reparses() {
        let mut config = ImitatorConfig::default();
        config.control.scale = 0.5;
        config.pose.bind_addr = "0.0.0.0:7000".to_string();

        let text = config.to_toml_string().unwrap();
        assert_eq!(ImitatorConfig::from_toml_str(&text).unwrap(), config);
    }
}
