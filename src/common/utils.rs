use crate::model::{ProxyList, ProxyRecord};
use chrono::Local;
use std::collections::HashSet;
use tracing::Level;

/// 本地时区的可读时间，形如 `2025-01-02 15:04:05`。
pub fn now_string() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// 为可以等价表示为 SS 的 SSR 节点追加一个 SS 副本，副本名称带 `_ss` 后缀。
pub fn derive_proxies(mut proxies: ProxyList) -> ProxyList {
    let derived: Vec<ProxyRecord> = proxies
        .iter()
        .filter_map(|p| match p {
            ProxyRecord::ShadowsocksR(ssr) => ssr.to_shadowsocks(),
            _ => None,
        })
        .map(|mut ss| {
            ss.base.name = format!("{}_ss", ss.base.name);
            ProxyRecord::Shadowsocks(ss)
        })
        .collect();
    proxies.extend(derived);
    proxies
}

/// 按节点身份去重，保留首次出现的节点及其顺序。
pub fn dedup_proxies(proxies: ProxyList) -> ProxyList {
    let mut seen = HashSet::new();
    let mut result = Vec::new();

    for proxy in proxies.into_iter() {
        if seen.insert(proxy.identifier()) {
            result.push(proxy);
        }
    }
    result
}

// 把字符串转换成 Level，忽略大小写，不识别时返回 None
pub fn parse_level(s: &str) -> Option<Level> {
    match s.to_uppercase().as_str() {
        "ERROR" => Some(Level::ERROR),
        "WARN" | "WARNING" => Some(Level::WARN),
        "INFO" => Some(Level::INFO),
        "DEBUG" => Some(Level::DEBUG),
        "TRACE" => Some(Level::TRACE),
        _ => None,
    }
}
