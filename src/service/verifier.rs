//! # verifier 模块
//!
//! 健康检查阶段。
//!
//! - [`HealthCheck`]：检查阶段的统一接口，返回存活的代理；
//! - [`TcpHealthCheck`]：默认实现，对每个节点做一次 TCP 连通性探测，
//!   通过信号量限制并发，存活节点保持输入顺序。
//!
//! 这里不涉及任何代理协议，只确认 `server:port` 可达。

use crate::model::{ProxyList, ProxyRecord};
use async_trait::async_trait;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::sync::Semaphore;
use tracing::{debug, info};

#[async_trait]
pub trait HealthCheck: Send + Sync {
    /// 剔除不可用的节点。`timeout` 为 `None` 时使用实现自身的默认值。
    async fn check(&self, proxies: ProxyList, timeout: Option<Duration>) -> ProxyList;
}

#[derive(Debug, Clone)]
pub struct TcpHealthCheck {
    /// 并发探测上限。
    pub concurrency: usize,
    /// 未被配置覆盖时的单节点超时。
    pub default_timeout: Duration,
}

impl Default for TcpHealthCheck {
    fn default() -> Self {
        Self {
            concurrency: 64,
            default_timeout: Duration::from_secs(5),
        }
    }
}

/// 在超时内建立一次 TCP 连接，成功返回耗时。
pub(crate) async fn connect_time(address: &str, timeout: Duration) -> Option<Duration> {
    let start = Instant::now();
    match tokio::time::timeout(timeout, TcpStream::connect(address)).await {
        Ok(Ok(_)) => Some(start.elapsed()),
        _ => None,
    }
}

#[async_trait]
impl HealthCheck for TcpHealthCheck {
    async fn check(&self, proxies: ProxyList, timeout: Option<Duration>) -> ProxyList {
        let timeout = timeout.unwrap_or(self.default_timeout);
        let len = proxies.len();
        info!("🚀 开始健康检查，共 {} 条待验证，超时 {:?}", len, timeout);

        let alive = Arc::new(AtomicUsize::new(0));
        let semaphore = Arc::new(Semaphore::new(self.concurrency.max(1)));

        let tasks: Vec<_> = proxies
            .into_iter()
            .map(|proxy: ProxyRecord| {
                let alive = Arc::clone(&alive);
                let semaphore = Arc::clone(&semaphore);
                tokio::spawn(async move {
                    let Ok(_permit) = semaphore.acquire_owned().await else {
                        return None;
                    };
                    let address = proxy.address();
                    match connect_time(&address, timeout).await {
                        Some(elapsed) => {
                            alive.fetch_add(1, Ordering::SeqCst);
                            debug!("🟢 {} {} 可达，耗时 {}ms", proxy.name(), address, elapsed.as_millis());
                            Some(proxy)
                        }
                        None => {
                            debug!("🔴 {} {} 不可达", proxy.name(), address);
                            None
                        }
                    }
                })
            })
            .collect();

        let survivors: ProxyList = futures::future::join_all(tasks)
            .await
            .into_iter()
            .filter_map(|r| r.ok().flatten())
            .collect();

        let ok = alive.load(Ordering::SeqCst);
        info!("✅ 健康检查完成：总计 {} 条，存活 {} 条，失败 {} 条", len, ok, len - ok);
        survivors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::parser::parse_record;
    use tokio::net::TcpListener;

    fn trojan(name: &str, port: u16) -> ProxyRecord {
        parse_record(&format!(
            r#"{{"name":"{}","server":"127.0.0.1","port":{},"type":"trojan","password":"p"}}"#,
            name, port
        ))
        .unwrap()
    }

    #[tokio::test]
    async fn test_check_keeps_reachable_in_order() {
        let first = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let second = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let closed = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let closed_port = closed.local_addr().unwrap().port();
        drop(closed);

        let proxies = vec![
            trojan("a", first.local_addr().unwrap().port()),
            trojan("dead", closed_port),
            trojan("b", second.local_addr().unwrap().port()),
        ];

        let checker = TcpHealthCheck { concurrency: 2, ..Default::default() };
        let alive = checker.check(proxies, Some(Duration::from_secs(2))).await;
        let names: Vec<&str> = alive.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
