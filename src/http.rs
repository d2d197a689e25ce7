//! 执行 HTTP GET 请求、返回原始响应体的抓取层。

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::Result;

const USER_AGENT: &str = "song-helper-rs/0.1.0";

/// 抓取原始响应体的接口。
///
/// 只区分成功与失败，不对具体状态码做额外处理。
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// 对 `url` 发起 GET 请求，成功时返回响应体字节。
    async fn get(&self, url: &str) -> Result<Vec<u8>>;
}

/// 基于 `reqwest::Client` 的 `Fetcher` 实现。
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    http_client: Client,
}

impl ReqwestFetcher {
    /// 创建一个新的实例。`timeout` 为 `None` 时不设置请求超时。
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http_client: builder.build()?,
        })
    }

    /// 使用已有的 `reqwest::Client`。
    pub fn with_client(http_client: Client) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl Fetcher for ReqwestFetcher {
    async fn get(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await?
            .error_for_status()?;

        let body = response.bytes().await?;

        tracing::trace!(
            url = url,
            response.body = %String::from_utf8_lossy(&body),
            "原始 JSON 响应"
        );

        Ok(body.to_vec())
    }
}
