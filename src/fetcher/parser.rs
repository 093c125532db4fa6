//! 单行代理记录解析。
//!
//! 先把文本当作宽松的 JSON 对象读取 `type` 字段，确认是已知类型后，
//! 再用同一段文本按该类型的严格结构解析一次。任何一步失败都只返回 `None`，
//! 由调用方跳过该行。

use crate::model::proxy::{Shadowsocks, ShadowsocksR, Trojan, Vmess};
use crate::model::{ProxyRecord, ProxyType};
use serde_json::Value;

pub fn parse_record(raw: &str) -> Option<ProxyRecord> {
    let value: Value = serde_json::from_str(raw).ok()?;
    let tag = value.get("type")?.as_str()?;

    match ProxyType::from_tag(tag)? {
        ProxyType::Shadowsocks => serde_json::from_str::<Shadowsocks>(raw)
            .ok()
            .map(ProxyRecord::Shadowsocks),
        ProxyType::ShadowsocksR => serde_json::from_str::<ShadowsocksR>(raw)
            .ok()
            .map(ProxyRecord::ShadowsocksR),
        ProxyType::Vmess => serde_json::from_str::<Vmess>(raw)
            .ok()
            .map(ProxyRecord::Vmess),
        ProxyType::Trojan => serde_json::from_str::<Trojan>(raw)
            .ok()
            .map(ProxyRecord::Trojan),
    }
}
