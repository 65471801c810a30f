//! 仿真笛卡尔控制器
//!
//! 进程内的笛卡尔控制器实现，用于无硬件运行和测试。
//!
//! # 行为
//!
//! - 末端位姿在每次 `current_pose()` 查询时向最近一次目标靠近 `approach_gain` 比例
//! - 所有调用都会计数，可通过 [`SimHandle`] 在外部观察
//! - 连接参数的远端 / 本地端口必须非空且以 `/` 开头
//!
//! # 示例
//!
//! ```rust
//! use imitator_driver::{CartesianConnector, DeviceOptions, MotionSink, SimConfig, SimulatedConnector};
//!
//! let mut connector = SimulatedConnector::new(SimConfig::default());
//! let handle = connector.handle();
//! let mut arm = connector
//!     .connect(&DeviceOptions::new("/sim/cartesianController/right_arm", "/client"))
//!     .unwrap();
//!
//! arm.stop().unwrap();
//! assert_eq!(handle.snapshot().stop_calls, 1);
//! ```

use crate::device::{CartesianConnector, DeviceOptions, MotionSink};
use crate::error::DriverError;
use imitator_protocol::{AxisAngle, CartesianPose, DofMask, Position3D, TargetPose};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, trace};

/// 仿真控制器配置
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// 初始末端位姿
    pub initial_pose: CartesianPose,
    /// 各自由度限位（度），前三个为躯干
    pub joint_limits: Vec<(f64, f64)>,
    /// 每次查询时向目标靠近的比例（0..=1）
    pub approach_gain: f64,
    /// 连接成功但拒绝提供控制接口
    pub fail_capability: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        let mut joint_limits = vec![(-22.0, 70.0), (-39.0, 39.0), (-59.0, 59.0)];
        joint_limits.extend([
            (-95.0, 10.0),
            (0.0, 160.0),
            (-37.0, 80.0),
            (15.0, 106.0),
            (-90.0, 90.0),
            (-90.0, 0.0),
            (-20.0, 40.0),
        ]);
        Self {
            initial_pose: CartesianPose::new(Position3D::new(-0.30, 0.10, 0.10), AxisAngle::ZERO),
            joint_limits,
            approach_gain: 0.5,
            fail_capability: false,
        }
    }
}

/// 快照中保留的最近目标数
pub const MAX_RECORDED_TARGETS: usize = 256;

/// 仿真控制器状态快照
#[derive(Debug, Clone, PartialEq)]
pub struct SimSnapshot {
    /// 当前末端位姿
    pub pose: CartesianPose,
    /// 当前自由度配置
    pub dof: DofMask,
    /// 各自由度限位（度）
    pub joint_limits: Vec<(f64, f64)>,
    /// 跟踪模式
    pub tracking_mode: bool,
    /// 是否有打开的连接
    pub connected: bool,
    /// 成功建立的连接次数
    pub connections: u32,
    /// 最近接受的目标（按时间顺序，最多 [`MAX_RECORDED_TARGETS`] 条）
    pub targets: Vec<TargetPose>,
    /// 已接受的目标总数
    pub targets_accepted: u64,
    /// `stop()` 调用次数（连接打开期间）
    pub stop_calls: u32,
    /// `close()` 实际释放连接的次数
    pub close_calls: u32,
    /// `set_dof()` 调用次数
    pub set_dof_calls: u32,
}

#[derive(Debug)]
struct SimState {
    snapshot: SimSnapshot,
    fail_commands: bool,
    fail_pose_queries: bool,
    fail_stop: bool,
}

/// 仿真控制器的共享观察句柄
#[derive(Debug, Clone)]
pub struct SimHandle {
    state: Arc<Mutex<SimState>>,
}

impl SimHandle {
    /// 读取状态快照
    pub fn snapshot(&self) -> SimSnapshot {
        self.state.lock().snapshot.clone()
    }

    /// 令后续 `go_to_pose()` 失败
    pub fn set_fail_commands(&self, fail: bool) {
        self.state.lock().fail_commands = fail;
    }

    /// 令后续 `current_pose()` 失败
    pub fn set_fail_pose_queries(&self, fail: bool) {
        self.state.lock().fail_pose_queries = fail;
    }

    /// 令后续 `stop()` 失败
    pub fn set_fail_stop(&self, fail: bool) {
        self.state.lock().fail_stop = fail;
    }
}

/// 仿真控制器连接入口
#[derive(Debug)]
pub struct SimulatedConnector {
    config: SimConfig,
    handle: SimHandle,
}

impl SimulatedConnector {
    /// 创建连接入口
    pub fn new(config: SimConfig) -> Self {
        let dof = DofMask::new(vec![1.0; config.joint_limits.len()]);
        let snapshot = SimSnapshot {
            pose: config.initial_pose,
            dof,
            joint_limits: config.joint_limits.clone(),
            tracking_mode: false,
            connected: false,
            connections: 0,
            targets: Vec::new(),
            targets_accepted: 0,
            stop_calls: 0,
            close_calls: 0,
            set_dof_calls: 0,
        };
        let handle = SimHandle {
            state: Arc::new(Mutex::new(SimState {
                snapshot,
                fail_commands: false,
                fail_pose_queries: false,
                fail_stop: false,
            })),
        };
        Self { config, handle }
    }

    /// 观察句柄
    pub fn handle(&self) -> SimHandle {
        self.handle.clone()
    }
}

fn check_port(kind: &str, port: &str) -> Result<(), String> {
    if port.is_empty() {
        return Err(format!("empty {} port", kind));
    }
    if !port.starts_with('/') {
        return Err(format!("{} port '{}' must start with '/'", kind, port));
    }
    Ok(())
}

impl CartesianConnector for SimulatedConnector {
    type Sink = SimulatedCartesian;

    fn connect(&mut self, options: &DeviceOptions) -> Result<SimulatedCartesian, DriverError> {
        check_port("remote", &options.remote)
            .and_then(|_| check_port("local", &options.local))
            .map_err(|reason| DriverError::InvalidConnection {
                remote: options.remote.clone(),
                local: options.local.clone(),
                reason,
            })?;

        if self.config.fail_capability {
            return Err(DriverError::CapabilityUnavailable(format!(
                "{} does not expose a cartesian interface",
                options.remote
            )));
        }

        {
            let mut state = self.handle.state.lock();
            state.snapshot.connected = true;
            state.snapshot.connections += 1;
        }
        debug!("Simulated controller {} <- {}", options.remote, options.local);

        Ok(SimulatedCartesian {
            handle: self.handle.clone(),
            approach_gain: self.config.approach_gain.clamp(0.0, 1.0),
            open: true,
        })
    }
}

/// 仿真笛卡尔控制器句柄
#[derive(Debug)]
pub struct SimulatedCartesian {
    handle: SimHandle,
    approach_gain: f64,
    open: bool,
}

impl SimulatedCartesian {
    fn ensure_open(&self) -> Result<(), DriverError> {
        if self.open {
            Ok(())
        } else {
            Err(DriverError::Closed)
        }
    }
}

impl MotionSink for SimulatedCartesian {
    fn current_pose(&mut self) -> Result<CartesianPose, DriverError> {
        self.ensure_open()?;
        let mut state = self.handle.state.lock();
        if state.fail_pose_queries {
            return Err(DriverError::Device("pose query timed out".to_string()));
        }

        let snapshot = &mut state.snapshot;
        if let Some(target) = snapshot.targets.last().copied() {
            let goal = target.position();
            let pos = &mut snapshot.pose.position;
            pos.x += (goal.x - pos.x) * self.approach_gain;
            pos.y += (goal.y - pos.y) * self.approach_gain;
            pos.z += (goal.z - pos.z) * self.approach_gain;
            snapshot.pose.orientation = target.orientation();
        }
        Ok(snapshot.pose)
    }

    fn go_to_pose(&mut self, target: &TargetPose) -> Result<(), DriverError> {
        self.ensure_open()?;
        let mut state = self.handle.state.lock();
        if state.fail_commands {
            return Err(DriverError::Device("motion request rejected".to_string()));
        }
        trace!("Simulated go_to_pose {}", target);
        let snapshot = &mut state.snapshot;
        if snapshot.targets.len() == MAX_RECORDED_TARGETS {
            snapshot.targets.remove(0);
        }
        snapshot.targets.push(*target);
        snapshot.targets_accepted += 1;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), DriverError> {
        if !self.open {
            return Ok(());
        }
        let mut state = self.handle.state.lock();
        if state.fail_stop {
            return Err(DriverError::Device("stop request rejected".to_string()));
        }
        state.snapshot.stop_calls += 1;
        Ok(())
    }

    fn dof(&mut self) -> Result<DofMask, DriverError> {
        self.ensure_open()?;
        Ok(self.handle.state.lock().snapshot.dof.clone())
    }

    fn set_dof(&mut self, mask: &DofMask) -> Result<DofMask, DriverError> {
        self.ensure_open()?;
        let mut state = self.handle.state.lock();
        if mask.len() != state.snapshot.dof.len() {
            return Err(DriverError::Device(format!(
                "DOF mask has {} entries, chain has {}",
                mask.len(),
                state.snapshot.dof.len()
            )));
        }
        state.snapshot.dof = mask.clone();
        state.snapshot.set_dof_calls += 1;
        Ok(state.snapshot.dof.clone())
    }

    fn limits(&mut self, axis: usize) -> Result<(f64, f64), DriverError> {
        self.ensure_open()?;
        self.handle
            .state
            .lock()
            .snapshot
            .joint_limits
            .get(axis)
            .copied()
            .ok_or_else(|| DriverError::Device(format!("axis {} out of range", axis)))
    }

    fn set_limits(&mut self, axis: usize, min: f64, max: f64) -> Result<(), DriverError> {
        self.ensure_open()?;
        if min > max {
            return Err(DriverError::Device(format!(
                "axis {}: min {} > max {}",
                axis, min, max
            )));
        }
        let mut state = self.handle.state.lock();
        let slot = state
            .snapshot
            .joint_limits
            .get_mut(axis)
            .ok_or_else(|| DriverError::Device(format!("axis {} out of range", axis)))?;
        *slot = (min, max);
        Ok(())
    }

    fn set_tracking_mode(&mut self, enabled: bool) -> Result<(), DriverError> {
        self.ensure_open()?;
        self.handle.state.lock().snapshot.tracking_mode = enabled;
        Ok(())
    }

    fn close(&mut self) -> Result<(), DriverError> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        let mut state = self.handle.state.lock();
        state.snapshot.connected = false;
        state.snapshot.close_calls += 1;
        Ok(())
    }
}
