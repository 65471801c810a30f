//! 控制层错误类型定义

use crate::state::LoopState;
use imitator_driver::DriverError;
use thiserror::Error;

/// 控制层错误类型
#[derive(Error, Debug)]
pub enum ControlError {
    /// 设备连接无效、无法获取控制接口或初始配置失败（致命）
    #[error("Initialization failed: {0}")]
    Initialization(#[source] DriverError),

    /// 位姿话题无法打开（致命）
    #[error("Subscription failed: {0}")]
    Subscription(#[source] DriverError),

    /// 当前状态不允许该操作
    #[error("Cannot {operation} while {state:?}")]
    InvalidState {
        operation: &'static str,
        state: LoopState,
    },

    /// 无法启动工作线程
    #[error("Failed to spawn control worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    /// 工作线程 panic（设备已由安全网关闭）
    #[error("Control worker panicked")]
    WorkerPanicked,
}

impl ControlError {
    /// 是否为启动阶段的致命错误
    pub fn is_fatal_startup(&self) -> bool {
        matches!(
            self,
            ControlError::Initialization(_)
                | ControlError::Subscription(_)
                | ControlError::WorkerSpawn(_)
        )
    }
}
