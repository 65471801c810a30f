//! 位姿话题抽象

use crate::error::DriverError;
use imitator_protocol::PoseSample;

/// 已打开的位姿订阅
///
/// # 语义
///
/// - `try_read()` 非阻塞：没有新采样时立即返回 `None`
/// - 只保留最新一条：两次读取之间到达的旧采样被丢弃
/// - `close()` 幂等，关闭后 `try_read()` 恒为 `None`
pub trait PoseSource: Send {
    /// 读取最新的未读采样
    fn try_read(&mut self) -> Option<PoseSample>;

    /// 关闭订阅
    fn close(&mut self) -> Result<(), DriverError>;
}

/// 位姿话题的订阅入口
pub trait PoseSubscriber: Send {
    /// 订阅成功后得到的数据源
    type Source: PoseSource + 'static;

    /// 订阅指定话题
    ///
    /// # Errors
    /// - `DriverError::SubscriptionFailed`: 话题无法打开
    fn subscribe(&mut self, topic: &str) -> Result<Self::Source, DriverError>;
}
