use crate::model::ProxyRecord;
use crate::provider::Provider;
use tracing::warn;

/// Clash `proxies:` 文档，每个节点一行 flow mapping（JSON 即合法的 YAML）。
#[derive(Debug, Clone, Copy, Default)]
pub struct ClashProvider;

impl Provider for ClashProvider {
    fn cache_key(&self) -> &'static str {
        "clashproxies"
    }

    fn provide(&self, proxies: &[ProxyRecord]) -> String {
        let mut out = String::from("proxies:\n");
        for proxy in proxies {
            match serde_json::to_string(proxy) {
                Ok(line) => {
                    out.push_str("- ");
                    out.push_str(&line);
                    out.push('\n');
                }
                Err(e) => warn!("节点 {} 序列化失败：{}", proxy.name(), e),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::parser::parse_record;

    #[test]
    fn test_provide_round_trips_through_parser() {
        let raw = r#"{"name":"hk","server":"hk.example.com","port":443,"type":"ssr","cipher":"chacha20","password":"pw","protocol":"origin","obfs":"plain"}"#;
        let record = parse_record(raw).unwrap();

        let text = ClashProvider.provide(std::slice::from_ref(&record));
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("proxies:"));
        let line = lines.next().unwrap();
        assert_eq!(parse_record(&line[2..]).unwrap(), record);
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(ClashProvider.provide(&[]), "proxies:\n");
    }

    #[test]
    fn test_transport_options_survive() {
        let vmess = r#"{"name":"us","server":"us.example.com","port":443,"type":"vmess","uuid":"u-1","alterId":0,"network":"h2","tls":true,"h2-opts":{"host":["a.com"],"path":"/p"}}"#;
        let trojan = r#"{"name":"jp","server":"jp.example.com","port":443,"type":"trojan","password":"pw","network":"grpc","grpc-opts":{"grpc-service-name":"x"}}"#;
        let records = vec![parse_record(vmess).unwrap(), parse_record(trojan).unwrap()];

        let text = ClashProvider.provide(&records);
        let lines: Vec<&str> = text.lines().skip(1).collect();
        assert_eq!(lines.len(), 2);

        let v: serde_json::Value = serde_json::from_str(&lines[0][2..]).unwrap();
        assert_eq!(v["network"], "h2");
        assert_eq!(v["h2-opts"]["host"][0], "a.com");
        assert_eq!(v["h2-opts"]["path"], "/p");

        let t: serde_json::Value = serde_json::from_str(&lines[1][2..]).unwrap();
        assert_eq!(t["network"], "grpc");
        assert_eq!(t["grpc-opts"]["grpc-service-name"], "x");

        for (line, record) in lines.iter().zip(&records) {
            assert_eq!(&parse_record(&line[2..]).unwrap(), record);
        }
    }
}
