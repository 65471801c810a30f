//! 监督者集成测试
//!
//! 周期取 10 ms 量级，运行时间控制在几百毫秒内。

use imitator_control::{
    ControlError, ControlLoop, LoopConfig, LoopState, StopTrigger, Supervisor, SupervisorConfig,
};
use imitator_driver::{
    CartesianConnector, DeviceOptions, DriverError, MotionSink, SimConfig, SimulatedConnector,
    pose_channel,
};
use imitator_protocol::{AxisAngle, CartesianPose, DofMask, PoseSample, Position3D, TargetPose};
use imitator_tools::{ImitatorConfig, SafetyMapper};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::thread;
use std::time::{Duration, Instant};

fn fast(run_time: Duration) -> SupervisorConfig {
    SupervisorConfig {
        period: Duration::from_millis(10),
        run_time,
    }
}

#[test]
fn test_deadline_stops_and_releases_once() {
    let config = LoopConfig::default();
    let (feed, subscriber) = pose_channel(config.topic.clone());
    let connector = SimulatedConnector::new(SimConfig::default());
    let handle = connector.handle();
    let control = ControlLoop::new(connector, subscriber, SafetyMapper::default(), config);

    feed.publish(PoseSample::at(0.20, 0.10, 0.05)).unwrap();
    let report = Supervisor::new(control, fast(Duration::from_millis(150)))
        .run()
        .unwrap();

    assert_eq!(report.trigger, StopTrigger::Deadline);
    assert_eq!(report.final_state, LoopState::Stopped);
    assert!(report.elapsed >= Duration::from_millis(150));
    assert!(report.stats.ticks >= 2, "{:?}", report.stats);
    assert_eq!(report.stats.commands_sent, 1);

    let snapshot = handle.snapshot();
    assert_eq!(snapshot.targets.len(), 1);
    assert_eq!(snapshot.stop_calls, 1);
    assert_eq!(snapshot.close_calls, 1);
    assert!(!snapshot.connected);
}

#[test]
fn test_external_stop_ends_run_early() {
    let config = LoopConfig::default();
    let (feed, subscriber) = pose_channel(config.topic.clone());
    let connector = SimulatedConnector::new(SimConfig::default());
    let handle = connector.handle();
    let control = ControlLoop::new(connector, subscriber, SafetyMapper::default(), config);

    let supervisor = Supervisor::new(control, fast(Duration::from_secs(60)));
    let stop = supervisor.stop_handle();

    let publisher = thread::spawn(move || {
        for _ in 0..5 {
            feed.publish(PoseSample::at(0.0, 0.0, 0.0)).unwrap();
            thread::sleep(Duration::from_millis(20));
        }
        stop.stop();
    });

    let started = Instant::now();
    let report = supervisor.run().unwrap();
    publisher.join().unwrap();

    assert_eq!(report.trigger, StopTrigger::External);
    assert!(started.elapsed() < Duration::from_secs(10));
    assert!(report.stats.commands_sent >= 1);

    let snapshot = handle.snapshot();
    assert_eq!(snapshot.stop_calls, 1);
    assert_eq!(snapshot.close_calls, 1);
}

#[test]
fn test_initialization_failure_does_not_run() {
    let config = LoopConfig {
        device: DeviceOptions::new("/remote", "no-slash"),
        ..LoopConfig::default()
    };
    let (_feed, subscriber) = pose_channel(config.topic.clone());
    let connector = SimulatedConnector::new(SimConfig::default());
    let handle = connector.handle();
    let control = ControlLoop::new(connector, subscriber, SafetyMapper::default(), config);

    let err = Supervisor::new(control, fast(Duration::from_secs(60)))
        .run()
        .unwrap_err();
    assert!(matches!(err, ControlError::Initialization(_)));
    assert!(err.is_fatal_startup());

    let snapshot = handle.snapshot();
    assert_eq!(snapshot.connections, 0);
    assert_eq!(snapshot.stop_calls, 0);
}

#[test]
fn test_unbounded_run_time_waits_for_stop() {
    // TOML 整数上限 i64::MAX，已超出 Instant 可表示的范围
    let imitator =
        ImitatorConfig::from_toml_str("[control]\nrun_time_secs = 9223372036854775807\n").unwrap();
    let config = LoopConfig::from_config(&imitator);
    let (_feed, subscriber) = pose_channel(config.topic.clone());
    let connector = SimulatedConnector::new(SimConfig::default());
    let handle = connector.handle();
    let control = ControlLoop::new(connector, subscriber, imitator.mapper().unwrap(), config);

    let supervisor = Supervisor::new(control, SupervisorConfig::from_settings(&imitator.control));
    supervisor.stop_handle().stop();
    let report = supervisor.run().unwrap();

    assert_eq!(report.trigger, StopTrigger::External);
    assert_eq!(report.final_state, LoopState::Stopped);
    assert_eq!(handle.snapshot().close_calls, 1);
}

#[test]
fn test_unbounded_period_ticks_once() {
    let config = LoopConfig::default();
    let (_feed, subscriber) = pose_channel(config.topic.clone());
    let control = ControlLoop::new(
        SimulatedConnector::new(SimConfig::default()),
        subscriber,
        SafetyMapper::default(),
        config,
    );

    let report = Supervisor::new(
        control,
        SupervisorConfig {
            period: Duration::from_millis(u64::MAX),
            run_time: Duration::from_millis(100),
        },
    )
    .run()
    .unwrap();

    assert_eq!(report.trigger, StopTrigger::Deadline);
    assert_eq!(report.stats.ticks, 1);
    assert_eq!(report.stats.overruns, 0);
}

/// 每次下发目标都会 panic 的控制器
struct PanickingConnector {
    closes: Arc<AtomicU32>,
}

struct PanickingSink {
    closes: Arc<AtomicU32>,
}

impl CartesianConnector for PanickingConnector {
    type Sink = PanickingSink;

    fn connect(&mut self, _options: &DeviceOptions) -> Result<PanickingSink, DriverError> {
        Ok(PanickingSink {
            closes: self.closes.clone(),
        })
    }
}

impl MotionSink for PanickingSink {
    fn current_pose(&mut self) -> Result<CartesianPose, DriverError> {
        Ok(CartesianPose::new(Position3D::ZERO, AxisAngle::ZERO))
    }

    fn go_to_pose(&mut self, _target: &TargetPose) -> Result<(), DriverError> {
        panic!("controller fault");
    }

    fn stop(&mut self) -> Result<(), DriverError> {
        Ok(())
    }

    fn dof(&mut self) -> Result<DofMask, DriverError> {
        Ok(DofMask::new(vec![1.0; 10]))
    }

    fn set_dof(&mut self, mask: &DofMask) -> Result<DofMask, DriverError> {
        Ok(mask.clone())
    }

    fn limits(&mut self, _axis: usize) -> Result<(f64, f64), DriverError> {
        Ok((-22.0, 70.0))
    }

    fn set_limits(&mut self, _axis: usize, _min: f64, _max: f64) -> Result<(), DriverError> {
        Ok(())
    }

    fn set_tracking_mode(&mut self, _enabled: bool) -> Result<(), DriverError> {
        Ok(())
    }

    fn close(&mut self) -> Result<(), DriverError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn test_worker_panic_still_releases_device() {
    let closes = Arc::new(AtomicU32::new(0));
    let config = LoopConfig::default();
    let (feed, subscriber) = pose_channel(config.topic.clone());
    let connector = PanickingConnector {
        closes: closes.clone(),
    };
    let control = ControlLoop::new(connector, subscriber, SafetyMapper::default(), config);

    feed.publish(PoseSample::at(0.0, 0.0, 0.0)).unwrap();
    let err = Supervisor::new(control, fast(Duration::from_secs(60)))
        .run()
        .unwrap_err();

    assert!(matches!(err, ControlError::WorkerPanicked));
    assert_eq!(closes.load(Ordering::SeqCst), 1);
}
