use crate::error::BoxError;
use async_trait::async_trait;

/// 拉取上游列表文本的统一接口，便于替换为测试实现。
#[async_trait]
pub trait ListingClient: Send + Sync {
    async fn get_text(&self, url: &str) -> Result<String, BoxError>;
}

/// 基于 reqwest 的默认实现，使用客户端自身的默认超时。
#[derive(Debug, Clone, Default)]
pub struct HttpListingClient {
    client: reqwest::Client,
}

impl HttpListingClient {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ListingClient for HttpListingClient {
    async fn get_text(&self, url: &str) -> Result<String, BoxError> {
        let text = self.client.get(url).send().await?.text().await?;
        Ok(text)
    }
}
