//! # arm-imitator
//!
//! 让机械臂末端跟随人手位置的遥操作控制器。
//!
//! ```bash
//! # 使用默认配置（~/.config/arm-imitator/config.toml，不存在时使用内置默认值）
//! arm-imitator
//!
//! # 指定配置文件（运行时长与控制周期只来自配置）
//! arm-imitator --config imitator.toml
//!
//! # 查看生效的配置
//! arm-imitator --print-config
//! ```
//!
//! 退出码：正常结束为 0；位姿传输不可用或其他启动错误为 1。

use anyhow::{Context, Result};
use clap::Parser;
use imitator_control::{ControlLoop, LoopConfig, Supervisor, SupervisorConfig};
use imitator_driver::{NetworkContext, SimConfig, SimulatedConnector};
use imitator_tools::ImitatorConfig;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// 未设置 `RUST_LOG` 时的日志过滤
const DEFAULT_LOG_FILTER: &str = "arm_imitator=info,imitator_control=info";

/// arm-imitator - 机械臂模仿人手的遥操作控制器
#[derive(Parser, Debug)]
#[command(name = "arm-imitator")]
#[command(about = "Teleoperation controller: the robot arm imitates a tracked human hand", long_about = None)]
#[command(version)]
struct Cli {
    /// 配置文件路径（TOML）
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 覆盖位姿话题监听地址（IP:PORT）
    #[arg(long)]
    bind: Option<String>,

    /// 打印生效的配置后退出
    #[arg(long)]
    print_config: bool,
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        },
    }
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = effective_config(&cli)?;
    if cli.print_config {
        print!("{}", config.to_toml_string()?);
        return Ok(ExitCode::SUCCESS);
    }

    let network = match NetworkContext::check(&config.pose.bind_addr, config.pose.node.clone()) {
        Ok(network) => network,
        Err(e) => {
            error!("{}", e);
            eprintln!("No pose transport available, quitting");
            return Ok(ExitCode::from(1));
        },
    };

    let control = ControlLoop::new(
        SimulatedConnector::new(SimConfig::default()),
        network.pose_subscriber(),
        config.mapper()?,
        LoopConfig::from_config(&config),
    );
    let supervisor = Supervisor::new(control, SupervisorConfig::from_settings(&config.control));

    let stop = supervisor.stop_handle();
    ctrlc::set_handler(move || {
        info!("Interrupt received, stopping");
        stop.stop();
    })
    .context("设置信号处理失败")?;

    let report = supervisor.run().context("控制器运行失败")?;
    info!(
        "Stopped by {:?} after {:.1?}: {} ticks, {} commands, {} idle, {} command failures",
        report.trigger,
        report.elapsed,
        report.stats.ticks,
        report.stats.commands_sent,
        report.stats.idle_ticks,
        report.stats.command_failures
    );
    Ok(ExitCode::SUCCESS)
}

/// 加载配置并应用命令行覆盖
fn effective_config(cli: &Cli) -> Result<ImitatorConfig> {
    let mut config = match &cli.config {
        Some(path) => ImitatorConfig::load_from_file(path)?,
        None => load_default_config()?,
    };

    if let Some(bind) = &cli.bind {
        config.pose.bind_addr = bind.clone();
    }
    config.validate()?;
    Ok(config)
}

/// 用户配置目录下的配置文件，不存在时使用默认配置
fn load_default_config() -> Result<ImitatorConfig> {
    match default_config_path() {
        Some(path) if path.exists() => {
            info!("Loading configuration from {}", path.display());
            ImitatorConfig::load_from_file(&path)
        },
        _ => Ok(ImitatorConfig::default()),
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("arm-imitator").join("config.toml"))
}
