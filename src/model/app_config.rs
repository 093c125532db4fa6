use crate::error::PoolError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";
const DEFAULT_CONNECTION: usize = 5;
const DEFAULT_CRON_INTERVAL: u64 = 15;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// 上游代理池地址，按配置顺序依次抓取。
    #[serde(default)]
    pub server_url: Vec<String>,

    /// 健康检查超时（秒）。缺省或为负数时使用检查阶段自身的默认值。
    #[serde(default)]
    pub healthcheck_timeout: Option<i64>,

    #[serde(default)]
    pub speedtest: bool,

    /// 测速并发数，0 视为默认值 5。
    #[serde(default)]
    pub connection: usize,

    /// 测速超时（秒），规则同 `healthcheck_timeout`。
    #[serde(default)]
    pub speed_timeout: Option<i64>,

    /// 把上游节点名中的首个 `" |"` 替换为 `"_"`。
    #[serde(default)]
    pub show_remote_speed: bool,

    /// 两轮任务之间的间隔（分钟），0 视为默认值 15。
    #[serde(default)]
    pub cron_interval: u64,

    #[serde(default)]
    pub log: LoggingConfig,
}

/// 日志输出设置。
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 控制台输出的级别列表，不识别的级别被忽略。
    pub console_levels: Vec<String>,

    /// 日志文件所在目录，不存在时自动创建。
    pub dir: String,

    /// 日志文件名，多次启动追加写入同一个文件。
    pub file: String,

    /// 文件日志过滤指令，语法同 `RUST_LOG`，如 `debug,reqwest=info`。
    pub file_filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            console_levels: vec!["info".into(), "warn".into(), "error".into()],
            dir: "logs".into(),
            file: "poolcheck.log".into(),
            file_filter: "debug".into(),
        }
    }
}

impl AppConfig {
    /// 从本地文件或 http(s) 链接读取配置。
    pub async fn load(path: Option<&str>) -> Result<Self, PoolError> {
        let path = path.unwrap_or(DEFAULT_CONFIG_PATH);
        let source = if path.starts_with("http://") || path.starts_with("https://") {
            let text = reqwest::get(path)
                .await
                .and_then(|resp| resp.error_for_status())
                .map_err(|e| PoolError::Config(format!("config file http get fail: {e}")))?
                .text()
                .await
                .map_err(|e| PoolError::Config(format!("config file http get fail: {e}")))?;
            config::Config::builder()
                .add_source(config::File::from_str(&text, config::FileFormat::Yaml))
                .build()?
        } else {
            config::Config::builder()
                .add_source(config::File::with_name(path))
                .build()?
        };
        let config: AppConfig = source.try_deserialize()?;
        config.normalized()
    }

    /// 校验必填项并补齐默认值。
    pub fn normalized(mut self) -> Result<Self, PoolError> {
        if self.server_url.is_empty() {
            return Err(PoolError::Config("no server url".to_string()));
        }
        if self.connection == 0 {
            self.connection = DEFAULT_CONNECTION;
        }
        if self.cron_interval == 0 {
            self.cron_interval = DEFAULT_CRON_INTERVAL;
        }
        Ok(self)
    }

    pub fn healthcheck_timeout(&self) -> Option<Duration> {
        override_timeout(self.healthcheck_timeout)
    }

    pub fn speed_timeout(&self) -> Option<Duration> {
        override_timeout(self.speed_timeout)
    }

    pub fn cron_period(&self) -> Duration {
        Duration::from_secs(self.cron_interval.saturating_mul(60))
    }
}

fn override_timeout(secs: Option<i64>) -> Option<Duration> {
    secs.and_then(|s| u64::try_from(s).ok()).map(Duration::from_secs)
}
