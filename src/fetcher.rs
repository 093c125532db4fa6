pub mod client;
pub mod dedup;
pub mod parser;
pub mod source;

use crate::error::PoolError;
use crate::fetcher::client::ListingClient;
use crate::fetcher::dedup::SeenSet;
use crate::fetcher::source::{fetch_source, FetchOptions};
use crate::model::ProxyList;
use tracing::{error, info};

/// 按配置顺序抓取所有源并合并。
///
/// 整轮共用一个 [`SeenSet`]。任意一个源失败立即返回该错误，后续源不再请求，
/// 没有部分成功的结果。合并结果为空时返回 [`PoolError::EmptyAggregate`]。
pub async fn fetch_all_sources(
    client: &dyn ListingClient,
    sources: &[String],
    options: FetchOptions,
) -> Result<ProxyList, PoolError> {
    let mut seen = SeenSet::new();
    let mut proxies = ProxyList::new();

    for source in sources {
        match fetch_source(client, source, &mut seen, options).await {
            Ok(list) => proxies.extend(list),
            Err(e) => {
                error!("源 {} 抓取失败，终止本轮：{}", source, e);
                return Err(e.into());
            }
        }
    }

    if proxies.is_empty() {
        return Err(PoolError::EmptyAggregate);
    }
    info!("抓取到总共 {} 条代理（去重行数 {}）", proxies.len(), seen.line_count());
    Ok(proxies)
}
