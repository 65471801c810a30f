//! 进程内位姿话题
//!
//! 基于 crossbeam 通道的位姿话题，用于把同一进程内的姿态估计器直接接到
//! 控制循环上，也用于测试。
//!
//! # 示例
//!
//! ```rust
//! use imitator_driver::{pose_channel, PoseSource, PoseSubscriber};
//! use imitator_protocol::PoseSample;
//!
//! let (feed, mut subscriber) = pose_channel("/icub/jointPose");
//! let mut source = subscriber.subscribe("/icub/jointPose").unwrap();
//!
//! feed.publish(PoseSample::at(0.1, 0.0, 0.0)).unwrap();
//! feed.publish(PoseSample::at(0.2, 0.0, 0.0)).unwrap();
//! assert_eq!(source.try_read().unwrap().position.x, 0.2);
//! assert!(source.try_read().is_none());
//! ```

use crate::error::DriverError;
use crate::source::{PoseSource, PoseSubscriber};
use crossbeam_channel::{Receiver, Sender};
use imitator_protocol::PoseSample;

/// 创建一个进程内话题，返回发布端与订阅入口
pub fn pose_channel(topic: impl Into<String>) -> (PoseFeed, ChannelPoseSubscriber) {
    let topic = topic.into();
    let (tx, rx) = crossbeam_channel::unbounded();
    (
        PoseFeed {
            topic: topic.clone(),
            tx,
        },
        ChannelPoseSubscriber {
            topic,
            rx: Some(rx),
        },
    )
}

/// 发布端（可克隆）
#[derive(Debug, Clone)]
pub struct PoseFeed {
    topic: String,
    tx: Sender<PoseSample>,
}

impl PoseFeed {
    /// 发布一条采样
    ///
    /// # Errors
    /// - `DriverError::Closed`: 订阅端已关闭
    pub fn publish(&self, sample: PoseSample) -> Result<(), DriverError> {
        // 无界通道，send 不会阻塞
        self.tx.send(sample).map_err(|_| DriverError::Closed)
    }

    /// 话题名
    pub fn topic(&self) -> &str {
        &self.topic
    }
}

/// 进程内订阅入口（只能订阅一次）
#[derive(Debug)]
pub struct ChannelPoseSubscriber {
    topic: String,
    rx: Option<Receiver<PoseSample>>,
}

impl PoseSubscriber for ChannelPoseSubscriber {
    type Source = ChannelPoseSource;

    fn subscribe(&mut self, topic: &str) -> Result<ChannelPoseSource, DriverError> {
        if topic != self.topic {
            return Err(DriverError::SubscriptionFailed {
                topic: topic.to_string(),
                reason: format!("feed publishes '{}'", self.topic),
            });
        }
        let rx = self.rx.take().ok_or_else(|| DriverError::SubscriptionFailed {
            topic: topic.to_string(),
            reason: "already subscribed".to_string(),
        })?;
        Ok(ChannelPoseSource { rx: Some(rx) })
    }
}

/// 进程内位姿数据源
#[derive(Debug)]
pub struct ChannelPoseSource {
    rx: Option<Receiver<PoseSample>>,
}

impl PoseSource for ChannelPoseSource {
    fn try_read(&mut self) -> Option<PoseSample> {
        self.rx.as_ref()?.try_iter().last()
    }

    fn close(&mut self) -> Result<(), DriverError> {
        self.rx = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe_once() {
        let (_feed, mut sub) = pose_channel("/pose");
        assert!(sub.subscribe("/pose").is_ok());
        let err = sub.subscribe("/pose").unwrap_err();
        assert!(matches!(err, DriverError::SubscriptionFailed { .. }));
    }

    #[test]
    fn test_subscribe_wrong_topic() {
        let (_feed, mut sub) = pose_channel("/pose");
        let err = sub.subscribe("/other").unwrap_err();
        assert!(format!("{}", err).contains("/other"));
    }

    #[test]
    fn test_publish_after_close() {
        let (feed, mut sub) = pose_channel("/pose");
        let mut source = sub.subscribe("/pose").unwrap();

        feed.publish(PoseSample::at(0.1, 0.1, 0.1)).unwrap();
        source.close().unwrap();
        source.close().unwrap();

        assert!(source.try_read().is_none());
        assert!(matches!(
            feed.publish(PoseSample::default()),
            Err(DriverError::Closed)
        ));
    }
}
