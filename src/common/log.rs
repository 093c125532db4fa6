use crate::common::utils::parse_level;
use crate::model::app_config::LoggingConfig;
use std::fs::{create_dir_all, File, OpenOptions};
use std::io;
use std::path::Path;
use tracing::{Level, Metadata};
use tracing_subscriber::filter::{filter_fn, EnvFilter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

/// 初始化两路日志：追加写入的文件日志，以及按级别列表过滤的控制台输出。
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let file = open_log_file(Path::new(&config.dir), &config.file)?;
    let file_filter = EnvFilter::try_new(&config.file_filter)?;

    let allowed_levels: Vec<Level> = config
        .console_levels
        .iter()
        .filter_map(|lvl| parse_level(lvl))
        .collect();

    let file_layer = fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_target(true)
        .with_filter(file_filter);

    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false)
        .with_filter(filter_fn(move |metadata: &Metadata| {
            allowed_levels.contains(metadata.level())
        }));

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stdout_layer)
        .try_init()?;

    Ok(())
}

// 目录不存在时创建；文件以追加方式打开，保留之前几次运行的日志
fn open_log_file(dir: &Path, name: &str) -> io::Result<File> {
    create_dir_all(dir)?;
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(name))
}
