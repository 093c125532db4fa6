use thiserror::Error;

/// 传输层错误的统一装箱类型，便于 `ListingClient` 的不同实现返回各自的错误。
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 单个上游源抓取失败。任何一个源失败都会中止整轮任务。
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("failed to fetch {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: BoxError,
    },
    #[error("No proxy on remote server: {url}")]
    NoProxies { url: String },
}

/// 一轮任务级别的错误。
#[derive(Error, Debug)]
pub enum PoolError {
    #[error("config error: {0}")]
    Config(String),
    #[error(transparent)]
    ConfigLoad(#[from] config::ConfigError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("No Proxy")]
    EmptyAggregate,
}
