//! 自由度掩码
//!
//! 笛卡尔控制链的自由度（DOF）配置：前三个为躯干（pitch / roll / yaw，
//! 与控制器的关节顺序一致），其后为手臂关节。每个元素为 1.0（启用）
//! 或 0.0（禁用），与控制器的报告格式一致。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 躯干自由度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum TorsoAxis {
    /// 躯干俯仰
    Pitch = 0,
    /// 躯干翻滚
    Roll = 1,
    /// 躯干偏航
    Yaw = 2,
}

impl TorsoAxis {
    /// 全部躯干自由度（按掩码顺序）
    pub const ALL: [TorsoAxis; 3] = [TorsoAxis::Pitch, TorsoAxis::Roll, TorsoAxis::Yaw];

    /// 在掩码中的下标
    pub fn index(self) -> usize {
        self as usize
    }
}

/// 自由度掩码
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DofMask(Vec<f64>);

impl DofMask {
    /// 从原始数值创建
    pub fn new(values: Vec<f64>) -> Self {
        DofMask(values)
    }

    /// 自由度数量
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 第 `index` 个自由度是否启用（越界视为禁用）
    pub fn is_enabled(&self, index: usize) -> bool {
        self.0.get(index).is_some_and(|v| *v != 0.0)
    }

    /// 设置第 `index` 个自由度（越界时忽略）
    pub fn set(&mut self, index: usize, enabled: bool) {
        if let Some(slot) = self.0.get_mut(index) {
            *slot = if enabled { 1.0 } else { 0.0 };
        }
    }

    /// 返回禁用全部躯干自由度后的副本
    pub fn without_torso(&self) -> Self {
        let mut mask = self.clone();
        for axis in TorsoAxis::ALL {
            mask.set(axis.index(), false);
        }
        mask
    }

    /// 原始数值
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

impl fmt::Display for DofMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|v| format!("{:.0}", v)).collect();
        write!(f, "[{}]", parts.join(" "))
    }
}
