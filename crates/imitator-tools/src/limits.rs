//! # 工作空间限制
//!
//! 映射目标每个轴的上下界（米）。运行期间只读。

use serde::{Deserialize, Serialize};

/// 工作空间限制
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceLimits {
    /// X 上界
    pub x_max: f64,
    /// X 下界
    pub x_min: f64,
    /// Y 上界
    pub y_max: f64,
    /// Y 下界
    pub y_min: f64,
    /// Z 上界
    pub z_max: f64,
    /// Z 下界
    pub z_min: f64,
}

impl WorkspaceLimits {
    /// 以上界创建对称限制（下界 = -上界）
    pub fn symmetric(x_max: f64, y_max: f64, z_max: f64) -> Self {
        Self {
            x_max,
            x_min: -x_max,
            y_max,
            y_min: -y_max,
            z_max,
            z_min: -z_max,
        }
    }

    /// 按 `(轴名, 下界, 上界)` 列出三个轴
    pub fn axes(&self) -> [(&'static str, f64, f64); 3] {
        [
            ("x", self.x_min, self.x_max),
            ("y", self.y_min, self.y_max),
            ("z", self.z_min, self.z_max),
        ]
    }
}

impl Default for WorkspaceLimits {
    fn default() -> Self {
        Self::symmetric(0.40, 0.50, 0.40)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let limits = WorkspaceLimits::default();
        assert_eq!(limits.x_max, 0.40);
        assert_eq!(limits.x_min, -0.40);
        assert_eq!(limits.y_max, 0.50);
        assert_eq!(limits.y_min, -0.50);
        assert_eq!(limits.z_max, 0.40);
        assert_eq!(limits.z_min, -0.40);
    }

    #[test]
    fn test_axes_order() {
        let limits = WorkspaceLimits::symmetric(1.0, 2.0, 3.0);
        let axes = limits.axes();
        assert_eq!(axes[0], ("x", -1.0, 1.0));
        assert_eq!(axes[1], ("y", -2.0, 2.0));
        assert_eq!(axes[2], ("z", -3.0, 3.0));
    }
}
