//! 控制循环
//!
//! 每个周期：读取当前末端位姿（仅诊断）→ 读取最新人体位姿 → 安全映射 → 下发目标。
//!
//! 设备句柄与订阅句柄只在 `Running` 状态下存在；`shutdown()` 会依次停止运动、
//! 关闭订阅、释放设备，任何一步失败都不会阻止后续步骤。

use crate::error::ControlError;
use crate::state::{LoopState, LoopStats, TickOutcome};
use imitator_driver::{
    CartesianConnector, DeviceOptions, DriverError, MotionSink, PoseSource, PoseSubscriber,
};
use imitator_protocol::{DofMask, TorsoAxis};
use imitator_tools::{ImitatorConfig, SafetyMapper};
use tracing::{debug, error, info, warn};

/// 控制循环配置
#[derive(Debug, Clone, PartialEq)]
pub struct LoopConfig {
    /// 设备连接参数
    pub device: DeviceOptions,
    /// 躯干俯仰角上限（度）
    pub torso_pitch_max_deg: f64,
    /// 人体位姿话题
    pub topic: String,
}

impl LoopConfig {
    /// 从应用配置构建
    pub fn from_config(config: &ImitatorConfig) -> Self {
        Self {
            device: DeviceOptions::new(config.device.remote.clone(), config.device.local.clone()),
            torso_pitch_max_deg: config.device.torso_pitch_max_deg,
            topic: config.pose.topic.clone(),
        }
    }
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self::from_config(&ImitatorConfig::default())
    }
}

/// 遥操作控制循环
///
/// 泛型参数：
/// - `C`: 笛卡尔控制器连接入口
/// - `S`: 位姿话题订阅入口
pub struct ControlLoop<C: CartesianConnector, S: PoseSubscriber> {
    connector: C,
    subscriber: S,
    mapper: SafetyMapper,
    config: LoopConfig,
    state: LoopState,
    sink: Option<C::Sink>,
    source: Option<S::Source>,
    initial_dof: Option<DofMask>,
    stats: LoopStats,
}

impl<C: CartesianConnector, S: PoseSubscriber> ControlLoop<C, S> {
    /// 创建控制循环（不触碰设备）
    pub fn new(connector: C, subscriber: S, mapper: SafetyMapper, config: LoopConfig) -> Self {
        Self {
            connector,
            subscriber,
            mapper,
            config,
            state: LoopState::Uninitialized,
            sink: None,
            source: None,
            initial_dof: None,
            stats: LoopStats::default(),
        }
    }

    /// 当前状态
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// 运行统计
    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    /// 安全映射器
    pub fn mapper(&self) -> &SafetyMapper {
        &self.mapper
    }

    /// 初始化前设备上报的 DOF（初始化成功后可用）
    pub fn initial_dof(&self) -> Option<&DofMask> {
        self.initial_dof.as_ref()
    }

    /// 初始化：连接设备、配置运动链、订阅位姿话题
    ///
    /// 失败时释放已获取的资源并保持 `Uninitialized`。
    ///
    /// # 错误
    /// - `ControlError::Initialization`: 设备连接无效、无控制接口或配置被拒绝
    /// - `ControlError::Subscription`: 话题无法打开
    /// - `ControlError::InvalidState`: 非 `Uninitialized` 状态下调用
    pub fn initialize(&mut self) -> Result<(), ControlError> {
        if self.state != LoopState::Uninitialized {
            return Err(ControlError::InvalidState {
                operation: "initialize",
                state: self.state,
            });
        }

        info!("ControlLoop: starting");
        let mut sink = self
            .connector
            .connect(&self.config.device)
            .map_err(|e| {
                error!("Cannot open cartesian controller {}: {}", self.config.device.remote, e);
                ControlError::Initialization(e)
            })?;

        let initial_dof = match self.configure_device(&mut sink) {
            Ok(dof) => dof,
            Err(e) => {
                error!("Cannot configure cartesian controller: {}", e);
                release_device(&mut sink);
                return Err(ControlError::Initialization(e));
            },
        };

        let source = match self.subscriber.subscribe(&self.config.topic) {
            Ok(source) => source,
            Err(e) => {
                error!("Cannot subscribe to {}: {}", self.config.topic, e);
                release_device(&mut sink);
                return Err(ControlError::Subscription(e));
            },
        };

        self.sink = Some(sink);
        self.source = Some(source);
        self.initial_dof = Some(initial_dof);
        self.state = LoopState::Running;
        info!("ControlLoop: running on topic {}", self.config.topic);
        Ok(())
    }

    /// 配置运动链：限制躯干俯仰、开启跟踪模式、关闭躯干自由度
    fn configure_device(&self, sink: &mut C::Sink) -> Result<DofMask, DriverError> {
        let current = sink.dof()?;

        let pitch = TorsoAxis::Pitch.index();
        let (min, max) = sink.limits(pitch)?;
        sink.set_limits(pitch, min, self.config.torso_pitch_max_deg)?;
        debug!(
            "Torso pitch limits [{:.1}, {:.1}] -> [{:.1}, {:.1}]",
            min, max, min, self.config.torso_pitch_max_deg
        );

        sink.set_tracking_mode(true)?;

        let applied = sink.set_dof(&current.without_torso())?;
        info!("DOF {} -> {}", current, applied);
        Ok(current)
    }

    /// 执行一个控制周期
    ///
    /// 没有新采样时不下发任何命令；下发失败只记录，下个周期以最新采样重试。
    ///
    /// # 错误
    /// - `ControlError::InvalidState`: 非 `Running` 状态下调用
    pub fn tick(&mut self) -> Result<TickOutcome, ControlError> {
        let (Some(sink), Some(source)) = (self.sink.as_mut(), self.source.as_mut()) else {
            return Err(ControlError::InvalidState {
                operation: "tick",
                state: self.state,
            });
        };
        self.stats.ticks += 1;

        let current = match sink.current_pose() {
            Ok(pose) => {
                info!("robot palm position (xyz)[m]: {}", pose.position);
                Some(pose)
            },
            Err(e) => {
                warn!("Cannot read arm pose: {}", e);
                self.stats.pose_read_failures += 1;
                None
            },
        };

        let Some(sample) = source.try_read() else {
            info!("human palm position (xyz): no data yet");
            self.stats.idle_ticks += 1;
            return Ok(TickOutcome::NoSample);
        };
        info!("human palm position (xyz): {}", sample.position);

        let (case, target) = self.mapper.map_with_case(&sample);
        debug!("mapping: {}", case);
        match current {
            Some(pose) => info!(
                "robot palm target (xyz)[m]: {} (delta {:.3} m)",
                target.position(),
                pose.position.distance(&target.position())
            ),
            None => info!("robot palm target (xyz)[m]: {}", target.position()),
        }

        match sink.go_to_pose(&target) {
            Ok(()) => {
                self.stats.commands_sent += 1;
                Ok(TickOutcome::Commanded(target))
            },
            Err(e) => {
                warn!("go_to_pose rejected: {}", e);
                self.stats.command_failures += 1;
                Ok(TickOutcome::CommandFailed)
            },
        }
    }

    pub(crate) fn record_overrun(&mut self) {
        self.stats.overruns += 1;
    }

    /// 关闭：停止运动、关闭订阅、释放设备
    ///
    /// 幂等；`Uninitialized` 状态下直接进入 `Stopped`，不触碰设备。
    /// 每一步都会执行，失败仅记录警告。
    pub fn shutdown(&mut self) {
        match self.state {
            LoopState::Running => {},
            LoopState::Uninitialized => {
                self.state = LoopState::Stopped;
                return;
            },
            LoopState::Stopped => return,
        }

        info!("ControlLoop: stopping the robot");
        if let Some(sink) = self.sink.as_mut()
            && let Err(e) = sink.stop()
        {
            warn!("Failed to stop motion: {}", e);
        }

        if let Some(mut source) = self.source.take()
            && let Err(e) = source.close()
        {
            warn!("Failed to close subscription: {}", e);
        }

        if let Some(mut sink) = self.sink.take()
            && let Err(e) = sink.close()
        {
            warn!("Failed to release cartesian controller: {}", e);
        }

        self.state = LoopState::Stopped;
        info!("ControlLoop: stopped");
    }
}

/// 初始化失败时释放设备
fn release_device<M: MotionSink>(sink: &mut M) {
    if let Err(e) = sink.stop() {
        warn!("Failed to stop motion: {}", e);
    }
    if let Err(e) = sink.close() {
        warn!("Failed to release cartesian controller: {}", e);
    }
}

impl<C: CartesianConnector, S: PoseSubscriber> Drop for ControlLoop<C, S> {
    fn drop(&mut self) {
        // 运行中被丢弃（例如工作线程 panic）时仍需停机
        if self.state == LoopState::Running {
            warn!("ControlLoop dropped while running, shutting down");
            self.shutdown();
        }
    }
}

impl<C: CartesianConnector, S: PoseSubscriber> std::fmt::Debug for ControlLoop<C, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlLoop")
            .field("state", &self.state)
            .field("topic", &self.config.topic)
            .field("stats", &self.stats)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imitator_driver::{SimConfig, SimulatedConnector, pose_channel};
    use imitator_protocol::PoseSample;

    fn sim_loop() -> (
        ControlLoop<SimulatedConnector, imitator_driver::ChannelPoseSubscriber>,
        imitator_driver::PoseFeed,
        imitator_driver::SimHandle,
    ) {
        let config = LoopConfig::default();
        let (feed, subscriber) = pose_channel(config.topic.clone());
        let connector = SimulatedConnector::new(SimConfig::default());
        let handle = connector.handle();
        let control = ControlLoop::new(connector, subscriber, SafetyMapper::default(), config);
        (control, feed, handle)
    }

    #[test]
    fn test_loop_config_from_default_config() {
        let config = LoopConfig::default();
        assert_eq!(config.topic, "/icub/jointPose");
        assert_eq!(config.device.remote, "/icubSim/cartesianController/right_arm");
        assert_eq!(config.torso_pitch_max_deg, 30.0);
    }

    #[test]
    fn test_initialize_configures_chain() {
        let (mut control, _feed, handle) = sim_loop();
        control.initialize().unwrap();
        assert_eq!(control.state(), LoopState::Running);

        let snapshot = handle.snapshot();
        assert!(snapshot.connected);
        assert!(snapshot.tracking_mode);
        assert_eq!(snapshot.joint_limits[TorsoAxis::Pitch.index()], (-22.0, 30.0));
        for axis in TorsoAxis::ALL {
            assert!(!snapshot.dof.is_enabled(axis.index()));
        }
        assert!(snapshot.dof.is_enabled(3));

        let initial = control.initial_dof().unwrap();
        assert!(initial.is_enabled(TorsoAxis::Pitch.index()));
    }

    #[test]
    fn test_initialize_twice_rejected() {
        let (mut control, _feed, handle) = sim_loop();
        control.initialize().unwrap();
        let err = control.initialize().unwrap_err();
        assert!(matches!(
            err,
            ControlError::InvalidState {
                operation: "initialize",
                state: LoopState::Running
            }
        ));
        assert_eq!(handle.snapshot().connections, 1);
    }

    #[test]
    fn test_torso_ceiling_below_minimum_fails_and_releases() {
        let mut config = LoopConfig::default();
        config.torso_pitch_max_deg = -40.0;
        let (_feed, subscriber) = pose_channel(config.topic.clone());
        let connector = SimulatedConnector::new(SimConfig::default());
        let handle = connector.handle();
        let mut control = ControlLoop::new(connector, subscriber, SafetyMapper::default(), config);

        let err = control.initialize().unwrap_err();
        assert!(matches!(err, ControlError::Initialization(_)));
        assert_eq!(control.state(), LoopState::Uninitialized);

        let snapshot = handle.snapshot();
        assert!(!snapshot.connected);
        assert_eq!(snapshot.close_calls, 1);
    }

    #[test]
    fn test_tick_records_stats() {
        let (mut control, feed, _handle) = sim_loop();
        control.initialize().unwrap();

        assert_eq!(control.tick().unwrap(), TickOutcome::NoSample);
        feed.publish(PoseSample::at(0.20, 0.10, 0.05)).unwrap();
        assert!(matches!(control.tick().unwrap(), TickOutcome::Commanded(_)));

        let stats = control.stats();
        assert_eq!(stats.ticks, 2);
        assert_eq!(stats.idle_ticks, 1);
        assert_eq!(stats.commands_sent, 1);
        assert_eq!(stats.overruns, 0);
    }

    #[test]
    fn test_drop_while_running_shuts_down() {
        let (mut control, _feed, handle) = sim_loop();
        control.initialize().unwrap();
        drop(control);

        let snapshot = handle.snapshot();
        assert_eq!(snapshot.stop_calls, 1);
        assert_eq!(snapshot.close_calls, 1);
        assert!(!snapshot.connected);
    }

    #[test]
    fn test_drop_uninitialized_is_silent() {
        let (control, _feed, handle) = sim_loop();
        drop(control);
        let snapshot = handle.snapshot();
        assert_eq!(snapshot.connections, 0);
        assert_eq!(snapshot.stop_calls, 0);
        assert_eq!(snapshot.close_calls, 0);
    }
}
