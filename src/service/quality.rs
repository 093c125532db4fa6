//! # quality 模块
//!
//! 测速阶段。实现直接修改传入列表中每个节点的元数据，不生成新列表。
//!
//! 默认实现 [`LatencySpeedTest`] 对每个节点做多次 TCP 建连，
//! 取成功次数的平均耗时写入 `delay_ms`；全部失败则清空该字段。

use crate::model::ProxyRecord;
use crate::service::verifier::connect_time;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::time::Duration;
use tracing::info;

#[async_trait]
pub trait SpeedTest: Send + Sync {
    /// 以 `connection` 个并发对全部节点测速，结果写回节点本身。
    async fn test_all(&self, proxies: &mut [ProxyRecord], connection: usize, timeout: Option<Duration>);
}

#[derive(Debug, Clone)]
pub struct LatencySpeedTest {
    /// 每个节点的探测次数。
    pub test_count: u32,
    pub default_timeout: Duration,
}

impl Default for LatencySpeedTest {
    fn default() -> Self {
        Self {
            test_count: 3,
            default_timeout: Duration::from_secs(10),
        }
    }
}

impl LatencySpeedTest {
    async fn measure(&self, address: String, timeout: Duration) -> Option<u64> {
        let mut successes = Vec::new();
        for _ in 0..self.test_count {
            if let Some(elapsed) = connect_time(&address, timeout).await {
                successes.push(elapsed.as_millis() as u64);
            }
        }
        average(&successes)
    }
}

fn average(samples: &[u64]) -> Option<u64> {
    if samples.is_empty() {
        None
    } else {
        Some(samples.iter().sum::<u64>() / samples.len() as u64)
    }
}

#[async_trait]
impl SpeedTest for LatencySpeedTest {
    async fn test_all(&self, proxies: &mut [ProxyRecord], connection: usize, timeout: Option<Duration>) {
        let timeout = timeout.unwrap_or(self.default_timeout);
        info!("开始测速，共 {} 条，并发 {}，超时 {:?}", proxies.len(), connection, timeout);

        let addresses: Vec<String> = proxies.iter().map(|p| p.address()).collect();
        let results: Vec<Option<u64>> = stream::iter(addresses)
            .map(|address| self.measure(address, timeout))
            .buffered(connection.max(1))
            .collect()
            .await;

        for (proxy, delay) in proxies.iter_mut().zip(results) {
            proxy.base_mut().delay_ms = delay;
        }
        let measured = proxies.iter().filter(|p| p.base().delay_ms.is_some()).count();
        info!("测速完成：{} 条有结果", measured);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::parser::parse_record;
    use tokio::net::TcpListener;

    #[test]
    fn test_average() {
        assert_eq!(average(&[]), None);
        assert_eq!(average(&[10, 20, 31]), Some(20));
    }

    #[tokio::test]
    async fn test_all_writes_delay_in_place() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let closed = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let closed_port = closed.local_addr().unwrap().port();
        drop(closed);

        let mut proxies: Vec<ProxyRecord> = [port, closed_port]
            .iter()
            .map(|p| {
                parse_record(&format!(
                    r#"{{"name":"n{}","server":"127.0.0.1","port":{},"type":"trojan","password":"p"}}"#,
                    p, p
                ))
                .unwrap()
            })
            .collect();

        let tester = LatencySpeedTest { test_count: 2, ..Default::default() };
        tester.test_all(&mut proxies, 2, Some(Duration::from_secs(2))).await;

        assert!(proxies[0].base().delay_ms.is_some());
        assert_eq!(proxies[1].base().delay_ms, None);
    }
}
