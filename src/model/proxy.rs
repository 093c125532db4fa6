use serde::{Deserialize, Serialize};
use std::fmt;

/// 支持的代理类型（封闭集合）。序列化形式即上游记录里的 `type` 字段。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProxyType {
    #[serde(rename = "ss")]
    Shadowsocks,
    #[serde(rename = "ssr")]
    ShadowsocksR,
    #[serde(rename = "vmess")]
    Vmess,
    #[serde(rename = "trojan")]
    Trojan,
}

impl ProxyType {
    /// 由 `type` 标签识别代理类型，未知标签返回 `None`。
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "ss" => Some(Self::Shadowsocks),
            "ssr" => Some(Self::ShadowsocksR),
            "vmess" => Some(Self::Vmess),
            "trojan" => Some(Self::Trojan),
            _ => None,
        }
    }

    pub fn as_tag(self) -> &'static str {
        match self {
            Self::Shadowsocks => "ss",
            Self::ShadowsocksR => "ssr",
            Self::Vmess => "vmess",
            Self::Trojan => "trojan",
        }
    }
}

impl fmt::Display for ProxyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// 所有代理共有的基础信息。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseInfo {
    /// 展示名称，解析后可能被改写。
    pub name: String,

    /// 服务器地址（域名或 IP）。
    pub server: String,

    pub port: u16,

    /// 类型标签，始终与所在的变体一致。
    #[serde(rename = "type")]
    pub proxy_type: ProxyType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub udp: Option<bool>,

    /// 测速阶段写入的平均连接延迟（毫秒），不参与上游解析与输出。
    #[serde(skip)]
    pub delay_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shadowsocks {
    #[serde(flatten)]
    pub base: BaseInfo,
    pub cipher: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin: Option<String>,
    #[serde(
        default,
        rename = "plugin-opts",
        skip_serializing_if = "Option::is_none"
    )]
    pub plugin_opts: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShadowsocksR {
    #[serde(flatten)]
    pub base: BaseInfo,
    pub cipher: String,
    pub password: String,
    pub protocol: String,
    pub obfs: String,
    #[serde(
        default,
        rename = "protocol-param",
        skip_serializing_if = "String::is_empty"
    )]
    pub protocol_param: String,
    #[serde(default, rename = "obfs-param", skip_serializing_if = "String::is_empty")]
    pub obfs_param: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vmess {
    #[serde(flatten)]
    pub base: BaseInfo,
    pub uuid: String,
    #[serde(default, rename = "alterId")]
    pub alter_id: u32,
    #[serde(default = "default_vmess_cipher")]
    pub cipher: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub network: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub tls: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servername: Option<String>,
    #[serde(
        default,
        rename = "skip-cert-verify",
        skip_serializing_if = "std::ops::Not::not"
    )]
    pub skip_cert_verify: bool,
    #[serde(default, rename = "ws-path", skip_serializing_if = "Option::is_none")]
    pub ws_path: Option<String>,
    #[serde(
        default,
        rename = "ws-headers",
        skip_serializing_if = "Option::is_none"
    )]
    pub ws_headers: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default, rename = "ws-opts", skip_serializing_if = "Option::is_none")]
    pub ws_opts: Option<serde_json::Value>,
    /// 未单独声明的字段（如 `h2-opts`、`grpc-opts`），原样保留以便重新输出。
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_vmess_cipher() -> String {
    "auto".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trojan {
    #[serde(flatten)]
    pub base: BaseInfo,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sni: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alpn: Vec<String>,
    #[serde(
        default,
        rename = "skip-cert-verify",
        skip_serializing_if = "std::ops::Not::not"
    )]
    pub skip_cert_verify: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// 一条解析完成的代理记录。
///
/// 序列化时不额外包一层标签，`type` 字段由 [`BaseInfo`] 给出，
/// 因此输出就是 Clash 格式的单个节点。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProxyRecord {
    Shadowsocks(Shadowsocks),
    ShadowsocksR(ShadowsocksR),
    Vmess(Vmess),
    Trojan(Trojan),
}

impl ProxyRecord {
    pub fn base(&self) -> &BaseInfo {
        match self {
            Self::Shadowsocks(p) => &p.base,
            Self::ShadowsocksR(p) => &p.base,
            Self::Vmess(p) => &p.base,
            Self::Trojan(p) => &p.base,
        }
    }

    pub fn base_mut(&mut self) -> &mut BaseInfo {
        match self {
            Self::Shadowsocks(p) => &mut p.base,
            Self::ShadowsocksR(p) => &mut p.base,
            Self::Vmess(p) => &mut p.base,
            Self::Trojan(p) => &mut p.base,
        }
    }

    /// 由变体本身得出类型，与 `base().proxy_type` 一致。
    pub fn proxy_type(&self) -> ProxyType {
        match self {
            Self::Shadowsocks(_) => ProxyType::Shadowsocks,
            Self::ShadowsocksR(_) => ProxyType::ShadowsocksR,
            Self::Vmess(_) => ProxyType::Vmess,
            Self::Trojan(_) => ProxyType::Trojan,
        }
    }

    pub fn name(&self) -> &str {
        &self.base().name
    }

    pub fn set_name(&mut self, name: String) {
        self.base_mut().name = name;
    }

    /// `server:port`，用于探测连接。
    pub fn address(&self) -> String {
        let base = self.base();
        format!("{}:{}", base.server, base.port)
    }

    /// 节点身份：类型、地址与凭据相同即视为同一节点，与名称无关。
    pub fn identifier(&self) -> String {
        let base = self.base();
        let credential = match self {
            Self::Shadowsocks(p) => format!("{}:{}", p.cipher, p.password),
            Self::ShadowsocksR(p) => {
                format!("{}:{}:{}:{}", p.cipher, p.password, p.protocol, p.obfs)
            }
            Self::Vmess(p) => p.uuid.clone(),
            Self::Trojan(p) => p.password.clone(),
        };
        format!("{}|{}|{}|{}", base.proxy_type, base.server, base.port, credential)
    }
}

impl ShadowsocksR {
    /// `origin` 协议加 `plain` 混淆的 SSR 与同密码的 SS 等价，可转换为 SS 节点。
    pub fn to_shadowsocks(&self) -> Option<Shadowsocks> {
        if self.protocol != "origin" || self.obfs != "plain" {
            return None;
        }
        Some(Shadowsocks {
            base: BaseInfo {
                proxy_type: ProxyType::Shadowsocks,
                ..self.base.clone()
            },
            cipher: self.cipher.clone(),
            password: self.password.clone(),
            plugin: None,
            plugin_opts: None,
            extra: serde_json::Map::new(),
        })
    }
}

/// 一轮任务内按首次出现顺序排列的代理列表。
pub type ProxyList = Vec<ProxyRecord>;
