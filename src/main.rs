use std::net::SocketAddr;

use anyhow::{Context, Result};
use bson::oid::ObjectId;
use clap::{Arg, ArgAction, ArgMatches, Command};
use crawl_core::{AppConfig, ObservabilityConfig};
use crawl_domain::entities::{RunMode, RunRequest};
use crawl_scheduler::Application;
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn cli() -> Command {
    Command::new("crawl-scheduler")
        .version("1.0.0")
        .about("分布式爬虫任务调度核心")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .global(true)
                .help("配置文件路径，未指定时按默认路径查找"),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .global(true)
                .help("日志级别，覆盖配置文件")
                .value_parser(["trace", "debug", "info", "warn", "error"]),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .value_name("FORMAT")
                .global(true)
                .help("日志格式，覆盖配置文件")
                .value_parser(["json", "pretty"]),
        )
        .subcommand(Command::new("run").about("启动服务（默认）"))
        .subcommand(Command::new("reconcile").about("执行一次索引对齐后退出"))
        .subcommand(
            Command::new("schedule")
                .about("为爬虫创建一次任务并输出任务ID")
                .arg(
                    Arg::new("spider")
                        .long("spider")
                        .value_name("ID")
                        .required(true)
                        .help("爬虫ID"),
                )
                .arg(
                    Arg::new("mode")
                        .long("mode")
                        .value_name("MODE")
                        .help("运行模式，未指定时使用爬虫配置")
                        .value_parser(["all-nodes", "selected-nodes", "random"]),
                )
                .arg(
                    Arg::new("node")
                        .long("node")
                        .value_name("ID")
                        .action(ArgAction::Append)
                        .help("目标节点ID，可重复"),
                )
                .arg(
                    Arg::new("priority")
                        .long("priority")
                        .value_name("N")
                        .value_parser(clap::value_parser!(i32))
                        .help("任务优先级"),
                )
                .arg(Arg::new("cmd").long("cmd").value_name("CMD").help("执行命令"))
                .arg(Arg::new("param").long("param").value_name("PARAM").help("执行参数")),
        )
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();

    let config_path = matches.get_one::<String>("config");
    let mut config = AppConfig::load(config_path.map(String::as_str)).with_context(|| {
        format!(
            "加载配置失败: {}",
            config_path.map(String::as_str).unwrap_or("默认路径")
        )
    })?;

    if let Some(level) = matches.get_one::<String>("log-level") {
        config.observability.log_level = level.clone();
    }
    if let Some(format) = matches.get_one::<String>("log-format") {
        config.observability.log_format = format.clone();
    }

    init_logging(&config.observability)?;
    if config.observability.metrics_enabled {
        init_metrics(&config.observability.metrics_bind_address)?;
    }

    info!("启动分布式爬虫调度核心");

    let app = Application::new(config).await?;
    let result = match matches.subcommand() {
        Some(("reconcile", _)) => run_reconcile(&app).await,
        Some(("schedule", args)) => run_schedule(&app, args).await,
        _ => run_service(&app).await,
    };

    app.shutdown().await;
    result
}

async fn run_service(app: &Application) -> Result<()> {
    app.start().await?;
    info!("服务已启动，等待关闭信号");

    wait_for_shutdown_signal().await;
    info!("收到关闭信号，开始关闭...");
    Ok(())
}

async fn run_reconcile(app: &Application) -> Result<()> {
    let report = app.reconcile_indexes().await;
    for (collection, e) in report.failed() {
        error!("集合 {} 索引对齐失败: {}", collection, e);
    }
    if !report.is_success() {
        return Err(anyhow::anyhow!(
            "{} 个集合索引对齐失败",
            report.failed().len()
        ));
    }
    info!("重建了 {} 个集合的索引", report.rebuilt().len());
    Ok(())
}

async fn run_schedule(app: &Application, args: &ArgMatches) -> Result<()> {
    let spider_id = parse_object_id(
        args.get_one::<String>("spider")
            .context("缺少 --spider 参数")?,
    )?;
    let request = build_run_request(args)?;

    let task_ids = app
        .schedule(&spider_id, request)
        .await
        .context("调度失败")?;

    for task_id in &task_ids {
        println!("{}", task_id.to_hex());
    }
    info!("已创建 {} 个任务", task_ids.len());
    Ok(())
}

fn build_run_request(args: &ArgMatches) -> Result<RunRequest> {
    let mut request = RunRequest::new();

    if let Some(mode) = args.get_one::<String>("mode") {
        request = request.with_mode(mode.parse::<RunMode>()?);
    }
    if let Some(nodes) = args.get_many::<String>("node") {
        let node_ids = nodes
            .map(|id| parse_object_id(id))
            .collect::<Result<Vec<_>>>()?;
        request = request.with_node_ids(node_ids);
    }
    if let Some(priority) = args.get_one::<i32>("priority") {
        request = request.with_priority(*priority);
    }
    if let Some(cmd) = args.get_one::<String>("cmd") {
        request = request.with_cmd(cmd.clone());
    }
    if let Some(param) = args.get_one::<String>("param") {
        request = request.with_param(param.clone());
    }
    Ok(request)
}

fn parse_object_id(value: &str) -> Result<ObjectId> {
    ObjectId::parse_str(value).with_context(|| format!("无效的ID: {value}"))
}

/// 默认过滤规则，未设置 RUST_LOG 时生效；驱动自身日志压到 warn
fn log_filter_directives(log_level: &str) -> String {
    format!("{},mongodb=warn", log_level.to_lowercase())
}

/// 按观测配置初始化日志，格式已在配置校验中限定为 json 或 pretty
fn init_logging(observability: &ObservabilityConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_filter_directives(&observability.log_level)));
    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if observability.log_format == "json" {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_target(true),
            )
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().pretty().with_target(false))
            .try_init()
    };
    installed.with_context(|| format!("初始化{}日志失败", observability.log_format))
}

fn init_metrics(bind_address: &str) -> Result<()> {
    let addr: SocketAddr = bind_address
        .parse()
        .with_context(|| format!("无效的指标监听地址: {bind_address}"))?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .context("安装Prometheus指标导出器失败")?;

    info!("Prometheus指标导出器监听 {}", addr);
    Ok(())
}

/// 等待关闭信号
async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("安装Ctrl+C信号处理器失败: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("安装SIGTERM信号处理器失败: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("收到Ctrl+C信号");
        },
        _ = terminate => {
            info!("收到SIGTERM信号");
        },
    }
}
