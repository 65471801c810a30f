//! 控制循环状态与统计

use imitator_protocol::TargetPose;

/// 控制循环生命周期状态
///
/// 设备句柄与位姿订阅当且仅当处于 `Running` 时有效。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopState {
    /// 尚未初始化（或初始化失败）
    #[default]
    Uninitialized,
    /// 运行中
    Running,
    /// 已关闭，不可再次启动
    Stopped,
}

impl LoopState {
    /// 是否运行中
    pub fn is_running(self) -> bool {
        self == LoopState::Running
    }
}

/// 单个周期的结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// 已下发目标
    Commanded(TargetPose),
    /// 本周期没有新采样，未下发任何命令
    NoSample,
    /// 设备拒绝了目标，下个周期自动重试
    CommandFailed,
}

/// 控制循环统计
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoopStats {
    /// 已执行周期数
    pub ticks: u64,
    /// 成功下发的目标数
    pub commands_sent: u64,
    /// 无新采样的周期数
    pub idle_ticks: u64,
    /// 诊断位姿读取失败次数
    pub pose_read_failures: u64,
    /// 目标下发失败次数
    pub command_failures: u64,
    /// 周期超时次数（执行时间超过周期）
    pub overruns: u64,
}
