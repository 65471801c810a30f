//! 驱动层错误类型定义

use imitator_protocol::ProtocolError;
use thiserror::Error;

/// 驱动层错误类型
#[derive(Error, Debug)]
pub enum DriverError {
    /// 设备连接参数无效或连接失败
    #[error("Invalid device connection (remote '{remote}', local '{local}'): {reason}")]
    InvalidConnection {
        remote: String,
        local: String,
        reason: String,
    },

    /// 连接成功但无法获取笛卡尔控制接口
    #[error("Cartesian control capability unavailable: {0}")]
    CapabilityUnavailable(String),

    /// 无法订阅位姿话题
    #[error("Failed to subscribe to '{topic}': {reason}")]
    SubscriptionFailed { topic: String, reason: String },

    /// 底层网络不可用
    #[error("Transport unavailable: {0}")]
    TransportUnavailable(String),

    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 消息解码错误
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// 设备句柄或订阅已关闭
    #[error("Handle already closed")]
    Closed,

    /// 设备拒绝请求
    #[error("Device error: {0}")]
    Device(String),
}

#[cfg(test)]
mod tests {
    use super::DriverError;

    #[test]
    fn test_driver_error_display() {
        let err = DriverError::InvalidConnection {
            remote: "".to_string(),
            local: "/client".to_string(),
            reason: "empty remote port".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Invalid device connection"), "{}", msg);
        assert!(msg.contains("empty remote port"), "{}", msg);

        let err = DriverError::SubscriptionFailed {
            topic: "/icub/jointPose".to_string(),
            reason: "address in use".to_string(),
        };
        assert_eq!(
            format!("{}", err),
            "Failed to subscribe to '/icub/jointPose': address in use"
        );

        assert_eq!(format!("{}", DriverError::Closed), "Handle already closed");
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::AddrInUse, "busy");
        let err: DriverError = io.into();
        assert!(matches!(err, DriverError::Io(_)));
    }
}
