use crate::model::proxy::{ProxyRecord, ProxyType};
use serde::Serialize;

/// 按类型统计的代理数量。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TypeCounts {
    pub ss: usize,
    pub ssr: usize,
    pub vmess: usize,
    pub trojan: usize,
}

impl TypeCounts {
    pub fn from_records(records: &[ProxyRecord]) -> Self {
        let mut counts = Self::default();
        for record in records {
            match record.proxy_type() {
                ProxyType::Shadowsocks => counts.ss += 1,
                ProxyType::ShadowsocksR => counts.ssr += 1,
                ProxyType::Vmess => counts.vmess += 1,
                ProxyType::Trojan => counts.trojan += 1,
            }
        }
        counts
    }
}

/// 一轮任务当前所处的阶段。只会单向前进，失败时进入 `Aborted`。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum RunStage {
    #[default]
    Idle,
    Fetching,
    CountingByType,
    HealthChecking,
    SpeedTesting,
    Publishing,
    Done,
    Aborted,
}

/// 提供给展示层读取的运行快照，每轮任务都会覆盖。
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub all_proxies_count: usize,
    pub type_counts: TypeCounts,
    pub usable_proxies_count: usize,
    pub stage: RunStage,
    /// 抓取完成时间；失败时为 "时间 错误信息"。
    pub last_crawl_time: String,
    pub last_check_time: String,
    pub last_speed_test_time: String,
    pub last_publish_time: String,
}
