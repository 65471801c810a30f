//! 生命周期监督
//!
//! 监督者初始化控制循环，把它交给周期工作线程，然后只等待三件事之一：
//! 外部停止信号、运行时间截止、工作线程提前退出。之后通知工作线程在当前周期
//! 结束后退出，回收控制循环并执行唯一一次 `shutdown()`。

use crate::control_loop::ControlLoop;
use crate::error::ControlError;
use crate::state::{LoopState, LoopStats};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded, select};
use imitator_driver::{CartesianConnector, PoseSubscriber};
use imitator_tools::ControlSettings;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// 工作线程名
const WORKER_NAME: &str = "imitator-control";

/// 监督配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupervisorConfig {
    /// 控制周期
    pub period: Duration,
    /// 最长运行时间
    pub run_time: Duration,
}

impl SupervisorConfig {
    pub fn from_settings(settings: &ControlSettings) -> Self {
        Self {
            period: settings.period(),
            run_time: settings.run_time(),
        }
    }
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self::from_settings(&ControlSettings::default())
    }
}

/// 停止原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopTrigger {
    /// 外部停止请求（如 Ctrl-C）
    External,
    /// 运行时间截止
    Deadline,
    /// 工作线程提前退出
    WorkerExited,
}

/// 运行报告
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub trigger: StopTrigger,
    /// 从进入运行到关闭完成的时间
    pub elapsed: Duration,
    pub stats: LoopStats,
    pub final_state: LoopState,
}

/// 外部停止句柄
///
/// 可跨线程克隆；多次调用 `stop()` 与一次等价。
#[derive(Debug, Clone)]
pub struct StopHandle {
    tx: Sender<()>,
}

impl StopHandle {
    /// 请求停止（不阻塞）
    pub fn stop(&self) {
        // 容量为 1：已有未处理的请求时忽略
        let _ = self.tx.try_send(());
    }
}

/// 生命周期监督者
pub struct Supervisor<C: CartesianConnector, S: PoseSubscriber> {
    control: ControlLoop<C, S>,
    config: SupervisorConfig,
    stop_tx: Sender<()>,
    stop_rx: Receiver<()>,
}

impl<C, S> Supervisor<C, S>
where
    C: CartesianConnector + 'static,
    S: PoseSubscriber + 'static,
{
    pub fn new(control: ControlLoop<C, S>, config: SupervisorConfig) -> Self {
        let (stop_tx, stop_rx) = bounded(1);
        Self {
            control,
            config,
            stop_tx,
            stop_rx,
        }
    }

    /// 获取外部停止句柄
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            tx: self.stop_tx.clone(),
        }
    }

    /// 运行直至停止
    ///
    /// 初始化失败时直接返回错误，不启动工作线程。返回时设备一定已关闭。
    ///
    /// # 错误
    /// - `ControlError::Initialization` / `ControlError::Subscription`: 启动失败
    /// - `ControlError::WorkerSpawn`: 无法创建工作线程
    /// - `ControlError::WorkerPanicked`: 工作线程 panic
    pub fn run(self) -> Result<RunReport, ControlError> {
        let Supervisor {
            mut control,
            config,
            stop_tx,
            stop_rx,
        } = self;

        control.initialize()?;
        info!(
            "Supervisor: running for up to {:?} with a {:?} period",
            config.run_time, config.period
        );

        let started = Instant::now();
        // 超出 Instant 表示范围时视为没有截止时间
        let deadline = started.checked_add(config.run_time);

        let (halt_tx, halt_rx) = bounded::<()>(1);
        let (done_tx, done_rx) = bounded::<()>(0);
        let period = config.period;

        let worker = thread::Builder::new()
            .name(WORKER_NAME.into())
            .spawn(move || {
                // 线程结束（含 panic 展开）时 done_tx 被丢弃
                let _done = done_tx;
                run_periodic(&mut control, period, &halt_rx);
                control
            })
            .map_err(ControlError::WorkerSpawn)?;

        let trigger = match deadline {
            Some(deadline) => {
                let remaining = deadline.saturating_duration_since(Instant::now());
                select! {
                    recv(stop_rx) -> _ => StopTrigger::External,
                    recv(done_rx) -> _ => StopTrigger::WorkerExited,
                    default(remaining) => StopTrigger::Deadline,
                }
            },
            None => select! {
                recv(stop_rx) -> _ => StopTrigger::External,
                recv(done_rx) -> _ => StopTrigger::WorkerExited,
            },
        };
        drop(stop_tx);
        info!("Supervisor: stopping ({:?})", trigger);

        drop(halt_tx);
        let mut control = match worker.join() {
            Ok(control) => control,
            Err(_) => {
                error!("Control worker panicked; device released during unwind");
                return Err(ControlError::WorkerPanicked);
            },
        };

        control.shutdown();
        let report = RunReport {
            trigger,
            elapsed: started.elapsed(),
            stats: control.stats(),
            final_state: control.state(),
        };
        info!(
            "Supervisor: done after {:?}, {} ticks, {} commands, {} overruns",
            report.elapsed, report.stats.ticks, report.stats.commands_sent, report.stats.overruns
        );
        Ok(report)
    }
}

/// 周期执行，直到 `halt` 收到信号或断开
///
/// 调度以固定时间点为锚：周期不重叠；若某个周期超时，下一周期立即开始并记为超时。
/// 下一时间点超出 `Instant` 表示范围时，只等待停止信号。
fn run_periodic<C, S>(control: &mut ControlLoop<C, S>, period: Duration, halt: &Receiver<()>)
where
    C: CartesianConnector,
    S: PoseSubscriber,
{
    let mut next = Some(Instant::now());
    loop {
        let halted = match next {
            Some(at) => !matches!(halt.recv_deadline(at), Err(RecvTimeoutError::Timeout)),
            None => {
                let _ = halt.recv();
                true
            },
        };
        if halted {
            break;
        }

        if let Err(e) = control.tick() {
            error!("Control tick failed: {}", e);
            break;
        }

        next = next.and_then(|at| at.checked_add(period));
        let now = Instant::now();
        if let Some(at) = next
            && at < now
        {
            warn!("Control tick overran its period by {:?}", now - at);
            control.record_overrun();
            next = Some(now);
        }
    }
    debug!("Control worker exiting");
}
