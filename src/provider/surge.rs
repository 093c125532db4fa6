use crate::model::proxy::{Shadowsocks, Trojan, Vmess};
use crate::model::ProxyRecord;
use crate::provider::Provider;

/// Surge `[Proxy]` 段落，每个节点一行。Surge 不支持 SSR，此类节点被跳过。
#[derive(Debug, Clone, Copy, Default)]
pub struct SurgeProvider;

impl Provider for SurgeProvider {
    fn cache_key(&self) -> &'static str {
        "surgeproxies"
    }

    fn provide(&self, proxies: &[ProxyRecord]) -> String {
        let mut out = String::new();
        for proxy in proxies {
            let line = match proxy {
                ProxyRecord::Shadowsocks(p) => ss_line(p),
                ProxyRecord::Vmess(p) => Some(vmess_line(p)),
                ProxyRecord::Trojan(p) => Some(trojan_line(p)),
                ProxyRecord::ShadowsocksR(_) => None,
            };
            let Some(mut line) = line else { continue };
            if let Some(delay) = proxy.base().delay_ms {
                line.push_str(&format!(" // {}ms", delay));
            }
            out.push_str(&line);
            out.push('\n');
        }
        out
    }
}

fn ss_line(p: &Shadowsocks) -> Option<String> {
    let mut line = format!(
        "{} = ss, {}, {}, encrypt-method={}, password={}",
        p.base.name, p.base.server, p.base.port, p.cipher, p.password
    );

    match p.plugin.as_deref() {
        None | Some("") => {}
        Some("obfs") | Some("obfs-local") | Some("simple-obfs") => {
            let opt = |key: &str| {
                p.plugin_opts
                    .as_ref()
                    .and_then(|opts| opts.get(key))
                    .and_then(|v| v.as_str())
                    .map(str::to_string)
            };
            if let Some(mode) = opt("mode").or_else(|| opt("obfs")) {
                line.push_str(&format!(", obfs={}", mode));
                if let Some(host) = opt("host").or_else(|| opt("obfs-host")) {
                    line.push_str(&format!(", obfs-host={}", host));
                }
            }
        }
        // 其余插件 Surge 无对应写法
        Some(_) => return None,
    }

    if p.base.udp == Some(true) {
        line.push_str(", udp-relay=true");
    }
    Some(line)
}

fn vmess_line(p: &Vmess) -> String {
    let mut line = format!(
        "{} = vmess, {}, {}, username={}",
        p.base.name, p.base.server, p.base.port, p.uuid
    );

    if p.network == "ws" {
        line.push_str(", ws=true");
        if let Some(path) = p.ws_path.as_deref().filter(|s| !s.is_empty()) {
            line.push_str(&format!(", ws-path={}", path));
        }
        let host = p
            .ws_headers
            .as_ref()
            .and_then(|h| h.get("Host"))
            .and_then(|v| v.as_str());
        if let Some(host) = host {
            line.push_str(&format!(", ws-headers=Host:{}", host));
        }
    }

    if p.tls {
        line.push_str(", tls=true");
        if let Some(sni) = p.servername.as_deref().filter(|s| !s.is_empty()) {
            line.push_str(&format!(", sni={}", sni));
        }
        if p.skip_cert_verify {
            line.push_str(", skip-cert-verify=true");
        }
    }
    line
}

fn trojan_line(p: &Trojan) -> String {
    let mut line = format!(
        "{} = trojan, {}, {}, password={}",
        p.base.name, p.base.server, p.base.port, p.password
    );
    if let Some(sni) = p.sni.as_deref().filter(|s| !s.is_empty()) {
        line.push_str(&format!(", sni={}", sni));
    }
    if p.skip_cert_verify {
        line.push_str(", skip-cert-verify=true");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::parser::parse_record;

    fn parse_all(raws: &[&str]) -> Vec<ProxyRecord> {
        raws.iter().map(|r| parse_record(r).unwrap()).collect()
    }

    #[test]
    fn test_provide_lines() {
        let mut proxies = parse_all(&[
            r#"{"name":"a","server":"a.com","port":8388,"type":"ss","cipher":"aes-128-gcm","password":"p1","plugin":"obfs","plugin-opts":{"mode":"http","host":"bing.com"}}"#,
            r#"{"name":"b","server":"b.com","port":443,"type":"ssr","cipher":"none","password":"p","protocol":"origin","obfs":"plain"}"#,
            r#"{"name":"c","server":"c.com","port":443,"type":"vmess","uuid":"u-1","network":"ws","ws-path":"/v","ws-headers":{"Host":"c.com"},"tls":true,"servername":"c.com"}"#,
            r#"{"name":"d","server":"d.com","port":443,"type":"trojan","password":"p2","sni":"d.com","skip-cert-verify":true}"#,
        ]);
        proxies[3].base_mut().delay_ms = Some(87);

        let text = SurgeProvider.provide(&proxies);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "a = ss, a.com, 8388, encrypt-method=aes-128-gcm, password=p1, obfs=http, obfs-host=bing.com",
                "c = vmess, c.com, 443, username=u-1, ws=true, ws-path=/v, ws-headers=Host:c.com, tls=true, sni=c.com",
                "d = trojan, d.com, 443, password=p2, sni=d.com, skip-cert-verify=true // 87ms",
            ]
        );
    }

    #[test]
    fn test_unsupported_ss_plugin_skipped() {
        let proxies = parse_all(&[
            r#"{"name":"a","server":"a.com","port":8388,"type":"ss","cipher":"aes-128-gcm","password":"p1","plugin":"v2ray-plugin"}"#,
        ]);
        assert_eq!(SurgeProvider.provide(&proxies), "");
    }
}
