//! 笛卡尔控制器抽象

use crate::error::DriverError;
use imitator_protocol::{CartesianPose, DofMask, TargetPose};

/// 设备连接参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceOptions {
    /// 远端端口（控制器服务）
    pub remote: String,
    /// 本地端口（本客户端）
    pub local: String,
}

impl DeviceOptions {
    /// 创建连接参数
    pub fn new(remote: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            remote: remote.into(),
            local: local.into(),
        }
    }
}

/// 已连接的笛卡尔控制器
///
/// 关节层执行、逆运动学与关节限位均由设备负责。
pub trait MotionSink: Send {
    /// 查询当前末端位姿（同步，仅用于诊断）
    fn current_pose(&mut self) -> Result<CartesianPose, DriverError>;

    /// 请求运动到目标位姿
    ///
    /// 只提交请求，不等待运动完成。
    fn go_to_pose(&mut self, target: &TargetPose) -> Result<(), DriverError>;

    /// 停止当前运动（任何时候都可调用）
    fn stop(&mut self) -> Result<(), DriverError>;

    /// 读取当前自由度配置
    fn dof(&mut self) -> Result<DofMask, DriverError>;

    /// 请求自由度重配置，返回设备实际采用的配置
    fn set_dof(&mut self, mask: &DofMask) -> Result<DofMask, DriverError>;

    /// 读取某个自由度的限位（度），返回 `(min, max)`
    fn limits(&mut self, axis: usize) -> Result<(f64, f64), DriverError>;

    /// 设置某个自由度的限位（度）
    fn set_limits(&mut self, axis: usize, min: f64, max: f64) -> Result<(), DriverError>;

    /// 开关跟踪模式
    fn set_tracking_mode(&mut self, enabled: bool) -> Result<(), DriverError>;

    /// 释放设备连接（幂等）
    fn close(&mut self) -> Result<(), DriverError>;
}

/// 设备连接入口
pub trait CartesianConnector: Send {
    /// 连接成功后得到的控制器句柄
    type Sink: MotionSink + 'static;

    /// 打开设备连接并获取笛卡尔控制接口
    ///
    /// # Errors
    /// - `DriverError::InvalidConnection`: 连接无效
    /// - `DriverError::CapabilityUnavailable`: 无法获取控制接口
    fn connect(&mut self, options: &DeviceOptions) -> Result<Self::Sink, DriverError>;
}
