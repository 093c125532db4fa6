//! # task 模块
//!
//! 一轮完整任务：抓取 → 计数 → 健康检查 → [测速] → 发布。
//!
//! 抓取失败时只记录错误与时间，缓存中上一轮的结果保持不变继续对外提供。
//! 各阶段完成后立即把时间与计数写入缓存，展示层可以看到实时进度。

use crate::common::cache::RunCache;
use crate::common::utils::{dedup_proxies, derive_proxies, now_string};
use crate::error::PoolError;
use crate::fetcher::client::ListingClient;
use crate::fetcher::fetch_all_sources;
use crate::fetcher::source::FetchOptions;
use crate::model::{AppConfig, ProxyType, RunStage, TypeCounts};
use crate::provider::Provider;
use crate::service::quality::SpeedTest;
use crate::service::verifier::HealthCheck;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// 校验后代理列表在缓存中的键。
pub const PROXIES_KEY: &str = "proxies";

/// 一轮成功任务的统计结果。
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub all: usize,
    pub type_counts: TypeCounts,
    pub usable: usize,
}

pub struct RunSequencer {
    config: Arc<AppConfig>,
    client: Arc<dyn ListingClient>,
    health_check: Arc<dyn HealthCheck>,
    speed_test: Arc<dyn SpeedTest>,
    providers: Vec<Box<dyn Provider>>,
    cache: Arc<RunCache>,
}

impl RunSequencer {
    pub fn new(
        config: Arc<AppConfig>,
        client: Arc<dyn ListingClient>,
        health_check: Arc<dyn HealthCheck>,
        speed_test: Arc<dyn SpeedTest>,
        providers: Vec<Box<dyn Provider>>,
        cache: Arc<RunCache>,
    ) -> Self {
        Self { config, client, health_check, speed_test, providers, cache }
    }

    pub async fn run(&self) -> Result<RunReport, PoolError> {
        let started = Instant::now();

        info!("========== [代理采集阶段] ==========");
        self.set_stage(RunStage::Fetching);
        let options = FetchOptions { show_remote_speed: self.config.show_remote_speed };
        let mut proxies = match fetch_all_sources(self.client.as_ref(), &self.config.server_url, options).await {
            Ok(list) => list,
            Err(e) => {
                error!("Get proxies error: {}", e);
                let stamp = format!("{} {}", now_string(), e);
                self.cache.update_summary(|s| {
                    s.stage = RunStage::Aborted;
                    s.last_crawl_time = stamp;
                });
                return Err(e);
            }
        };

        let fetched = proxies.len();
        proxies = dedup_proxies(derive_proxies(proxies));
        info!("衍生并按节点身份去重：{} -> {}", fetched, proxies.len());

        self.set_stage(RunStage::CountingByType);
        let all = proxies.len();
        let type_counts = TypeCounts::from_records(&proxies);
        self.cache.update_summary(|s| {
            s.all_proxies_count = all;
            s.type_counts = type_counts;
            s.last_crawl_time = now_string();
        });
        info!(
            "Number of proxies: {} ({}: {}, {}: {}, {}: {}, {}: {})",
            all,
            ProxyType::Shadowsocks,
            type_counts.ss,
            ProxyType::ShadowsocksR,
            type_counts.ssr,
            ProxyType::Vmess,
            type_counts.vmess,
            ProxyType::Trojan,
            type_counts.trojan,
        );

        info!("========== [健康检查阶段] ==========");
        self.set_stage(RunStage::HealthChecking);
        let timeout = self.config.healthcheck_timeout();
        if let Some(t) = timeout {
            info!("CONF: Health check timeout is set to {} seconds", t.as_secs());
        }
        proxies = self.health_check.check(proxies, timeout).await;
        let usable = proxies.len();
        info!("Usable proxy count: {}", usable);

        self.cache.set_list(PROXIES_KEY, proxies.clone());
        self.cache.update_summary(|s| {
            s.usable_proxies_count = usable;
            s.last_check_time = now_string();
        });

        if self.config.speedtest {
            info!("========== [测速阶段] ==========");
            self.set_stage(RunStage::SpeedTesting);
            let timeout = self.config.speed_timeout();
            if let Some(t) = timeout {
                info!("CONF: Speed test timeout is set to {} seconds", t.as_secs());
            }
            self.speed_test
                .test_all(&mut proxies, self.config.connection, timeout)
                .await;
            self.cache.set_list(PROXIES_KEY, proxies.clone());
            self.cache.update_summary(|s| s.last_speed_test_time = now_string());
        }

        info!("========== [发布阶段] ==========");
        self.set_stage(RunStage::Publishing);
        for provider in &self.providers {
            let text = provider.provide(&proxies);
            info!("{} 已更新（{} 字节）", provider.cache_key(), text.len());
            self.cache.set_text(provider.cache_key(), text);
        }
        self.cache.update_summary(|s| {
            s.last_publish_time = now_string();
            s.stage = RunStage::Done;
        });

        info!("========== [本轮完成 ✅] 耗时 {:.1}s ==========", started.elapsed().as_secs_f64());
        Ok(RunReport { all, type_counts, usable })
    }

    fn set_stage(&self, stage: RunStage) {
        self.cache.update_summary(|s| s.stage = stage);
    }
}
