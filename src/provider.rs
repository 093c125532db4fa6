//! 输出格式。每种格式把校验后的代理列表渲染成客户端配置文本，
//! 并写入缓存中各自的键。

pub mod clash;
pub mod surge;

use crate::model::ProxyRecord;

pub use clash::ClashProvider;
pub use surge::SurgeProvider;

pub trait Provider: Send + Sync {
    /// 渲染结果在缓存中的键。
    fn cache_key(&self) -> &'static str;

    fn provide(&self, proxies: &[ProxyRecord]) -> String;
}

/// 默认启用的全部输出格式。
pub fn default_providers() -> Vec<Box<dyn Provider>> {
    vec![Box::new(ClashProvider), Box::new(SurgeProvider)]
}
