use crate::error::FetchError;
use crate::fetcher::client::ListingClient;
use crate::fetcher::dedup::SeenSet;
use crate::fetcher::parser::parse_record;
use crate::model::ProxyList;
use tracing::{debug, info};

/// 本地默认代理池地址，只跳过末尾斜杠的处理。
pub const LOCAL_DEFAULT_SOURCE: &str = "http://127.0.0.1:8080";

const LISTING_SUFFIX: &str = "clash/proxies";
const MARKER_LEN: usize = 2;
const NULL_SENTINEL: &str = "NULL";

/// 每个源的解析选项。
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchOptions {
    pub show_remote_speed: bool,
}

/// 把配置中的服务器地址转换为列表接口地址。
///
/// 去掉一个末尾斜杠；若倒数第二段路径不是 `clash`，追加 `/clash/proxies`。
pub fn normalize_source_url(raw: &str) -> String {
    let url = if raw == LOCAL_DEFAULT_SOURCE {
        raw
    } else {
        raw.strip_suffix('/').unwrap_or(raw)
    };

    let segments: Vec<&str> = url.split('/').collect();
    let second_last = segments.len().checked_sub(2).map(|i| segments[i]);
    if second_last == Some("clash") {
        url.to_string()
    } else {
        format!("{}/{}", url, LISTING_SUFFIX)
    }
}

/// 抓取一个源并解析为代理列表。
///
/// 首行为表头，其余每行是 2 字符前缀加一条 JSON 记录。
/// 解析失败的行直接丢弃；首条数据行名称为 `NULL` 时视为该源没有代理。
pub async fn fetch_source(
    client: &dyn ListingClient,
    source: &str,
    seen: &mut SeenSet,
    options: FetchOptions,
) -> Result<ProxyList, FetchError> {
    let url = normalize_source_url(source);
    info!("Fetching proxies from {}", url);

    let body = client
        .get_text(&url)
        .await
        .map_err(|source| FetchError::Transport { url: url.clone(), source })?;

    let lines: Vec<&str> = body.split('\n').collect();
    if lines.len() < 2 {
        return Err(FetchError::NoProxies { url });
    }

    let mut list = ProxyList::new();
    for (i, line) in lines.iter().enumerate() {
        if i == 0 || line.len() < MARKER_LEN {
            continue;
        }
        if !seen.register(line) {
            continue;
        }
        let Some(record_text) = line.get(MARKER_LEN..) else {
            debug!("跳过无法切分前缀的记录：第 {} 行", i);
            continue;
        };
        let Some(mut record) = parse_record(record_text) else {
            debug!("跳过无法解析的记录：第 {} 行", i);
            continue;
        };

        if i == 1 && record.name() == NULL_SENTINEL {
            return Err(FetchError::NoProxies { url });
        }
        if options.show_remote_speed {
            let name = record.name().replacen(" |", "_", 1);
            record.set_name(name);
        }
        list.push(record);
    }

    info!("{} - got {} proxies", url, list.len());
    Ok(list)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxError;
    use async_trait::async_trait;

    struct StaticClient(Result<String, String>);

    #[async_trait]
    impl ListingClient for StaticClient {
        async fn get_text(&self, _url: &str) -> Result<String, BoxError> {
            self.0.clone().map_err(BoxError::from)
        }
    }

    fn ss_line(name: &str) -> String {
        format!(
            r#"- {{"name":"{}","server":"1.2.3.4","port":8388,"type":"ss","cipher":"aes-256-gcm","password":"pw"}}"#,
            name
        )
    }

    #[test]
    fn test_normalize() {
        assert_eq!(
            normalize_source_url("https://pool.example.com"),
            "https://pool.example.com/clash/proxies"
        );
        assert_eq!(
            normalize_source_url("https://pool.example.com/"),
            "https://pool.example.com/clash/proxies"
        );
        assert_eq!(
            normalize_source_url("https://pool.example.com/clash/proxies"),
            "https://pool.example.com/clash/proxies"
        );
        assert_eq!(
            normalize_source_url("https://pool.example.com/clash/proxies/"),
            "https://pool.example.com/clash/proxies"
        );
        assert_eq!(
            normalize_source_url(LOCAL_DEFAULT_SOURCE),
            "http://127.0.0.1:8080/clash/proxies"
        );
        assert_eq!(normalize_source_url("host"), "host/clash/proxies");
    }

    #[tokio::test]
    async fn test_fetch_mixed_lines() {
        let body = format!(
            "proxies:\n- not json\n{}\n{}\n\n-\n",
            ss_line("a"),
            ss_line("a")
        );
        let client = StaticClient(Ok(body));
        let mut seen = SeenSet::new();
        let list = fetch_source(&client, "http://pool", &mut seen, FetchOptions::default())
            .await
            .unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].name(), "a");
    }

    #[tokio::test]
    async fn test_single_line_body() {
        let client = StaticClient(Ok("proxies:".to_string()));
        let mut seen = SeenSet::new();
        let err = fetch_source(&client, "http://pool", &mut seen, FetchOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::NoProxies { .. }));
    }

    #[tokio::test]
    async fn test_transport_error() {
        let client = StaticClient(Err("connection refused".to_string()));
        let mut seen = SeenSet::new();
        let err = fetch_source(&client, "http://pool", &mut seen, FetchOptions::default())
            .await
            .unwrap_err();
        match err {
            FetchError::Transport { url, .. } => assert_eq!(url, "http://pool/clash/proxies"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_null_sentinel_on_first_line() {
        let body = format!("proxies:\n{}\n{}\n", ss_line("NULL"), ss_line("b"));
        let client = StaticClient(Ok(body));
        let mut seen = SeenSet::new();
        let err = fetch_source(&client, "http://pool", &mut seen, FetchOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::NoProxies { .. }));
    }

    #[tokio::test]
    async fn test_null_name_after_first_line_is_kept() {
        let body = format!("proxies:\n{}\n{}\n", ss_line("b"), ss_line("NULL"));
        let client = StaticClient(Ok(body));
        let mut seen = SeenSet::new();
        let list = fetch_source(&client, "http://pool", &mut seen, FetchOptions::default())
            .await
            .unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].name(), "NULL");
    }

    #[tokio::test]
    async fn test_remote_speed_rename() {
        let body = format!("proxies:\n{}\n", ss_line("US node |2 |3"));
        let client = StaticClient(Ok(body));
        let mut seen = SeenSet::new();
        let options = FetchOptions { show_remote_speed: true };
        let list = fetch_source(&client, "http://pool", &mut seen, options)
            .await
            .unwrap();
        assert_eq!(list[0].name(), "US node_2 |3");
    }

    #[tokio::test]
    async fn test_all_lines_seen_is_not_an_error() {
        let body = format!("proxies:\n{}\n", ss_line("a"));
        let client = StaticClient(Ok(body));
        let mut seen = SeenSet::new();
        seen.register(&ss_line("a"));
        let list = fetch_source(&client, "http://pool", &mut seen, FetchOptions::default())
            .await
            .unwrap();
        assert!(list.is_empty());
    }
}
