mod common;
mod error;
mod fetcher;
mod model;
mod provider;
mod service;

use crate::common::cache::CACHE;
use crate::common::log::init_logging;
use crate::fetcher::client::HttpListingClient;
use crate::model::AppConfig;
use crate::provider::default_providers;
use crate::service::quality::LatencySpeedTest;
use crate::service::task::RunSequencer;
use crate::service::verifier::TcpHealthCheck;
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(version, about = "Aggregate, check and republish proxies from proxypool servers")]
struct Args {
    /// 配置文件路径或 http(s) 链接，默认 config.yaml
    #[arg(short, long)]
    config: Option<String>,

    /// 只执行一轮后退出
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Arc::new(AppConfig::load(args.config.as_deref()).await?);

    // 配置就绪后立即初始化日志
    init_logging(&config.log)?;
    info!("Loaded {} proxypool server(s)", config.server_url.len());

    let sequencer = RunSequencer::new(
        config.clone(),
        Arc::new(HttpListingClient::new()),
        Arc::new(TcpHealthCheck::default()),
        Arc::new(LatencySpeedTest::default()),
        default_providers(),
        CACHE.clone(),
    );

    if args.once {
        let report = sequencer.run().await?;
        info!(
            "共 {} 个节点，可用 {} 个（ss {} / ssr {} / vmess {} / trojan {}）",
            report.all,
            report.usable,
            report.type_counts.ss,
            report.type_counts.ssr,
            report.type_counts.vmess,
            report.type_counts.trojan,
        );
        return Ok(());
    }

    let mut interval = tokio::time::interval(config.cron_period());
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        interval.tick().await;
        if let Err(e) = sequencer.run().await {
            error!("本轮任务失败，保留上一轮结果：{}", e);
        }
        let summary = CACHE.summary();
        info!(
            "当前快照：阶段 {:?}，可用 {}/{}，抓取 {}，检查 {}，测速 {}，发布 {}",
            summary.stage,
            summary.usable_proxies_count,
            summary.all_proxies_count,
            summary.last_crawl_time,
            summary.last_check_time,
            summary.last_speed_test_time,
            summary.last_publish_time,
        );
        info!("下一轮将在 {} 分钟后开始", config.cron_interval);
    }
}
