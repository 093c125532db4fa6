pub mod app_config;
pub mod proxy;
pub mod summary;

pub use app_config::AppConfig;
pub use proxy::{BaseInfo, ProxyList, ProxyRecord, ProxyType};
pub use summary::{RunStage, RunSummary, TypeCounts};
