//! 定义了整个 `song-helper` 库的错误类型 `SongHelperError`。

use std::io;
use thiserror::Error;

/// `song-helper` 库的通用错误枚举。
///
/// 提供商内部使用它配合 `?` 传播错误，只有在入口函数的边界处
/// 才会把它转换为失败的 `SongList`，其 `Display` 文本即为对外的错误消息。
#[derive(Error, Debug)]
pub enum SongHelperError {
    /// 访问上游 URL 失败（网络、传输层或非 2xx 状态码）。
    #[error("error accessing url {url}")]
    Network {
        /// 请求的完整 URL。
        url: String,
        /// `Fetcher` 返回的底层错误。
        #[source]
        source: Box<SongHelperError>,
    },

    /// 上游返回的 JSON 无法按对应的响应结构解析。
    #[error("error parsing {kind} from url {url}: {source}")]
    Parse {
        /// 正在解析的数据种类，例如 "song info"、"collect data"。
        kind: &'static str,
        /// 请求的完整 URL。
        url: String,
        /// 底层的 JSON 解析错误。
        #[source]
        source: serde_json::Error,
    },

    /// 上游返回了非成功的状态码。
    #[error("error getting url {url}: {message}")]
    ApiError {
        /// 请求的完整 URL。
        url: String,
        /// 上游附带的 `msg` 字段。
        message: String,
    },

    /// 上游返回成功状态，但歌曲信息全为空。
    #[error("invalid song id {0}")]
    InvalidSongId(String),

    /// 网络请求失败 (源自 `reqwest::Error`)
    #[error("网络请求失败: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// JSON 解析失败 (源自 `serde_json::Error`)
    #[error("JSON 解析失败: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// I/O 错误 (源自 `io::Error`)
    #[error("I/O 错误: {0}")]
    Io(#[from] io::Error),

    /// 内部错误
    #[error("内部错误: {0}")]
    Internal(String),
}

/// `SongHelperError` 的 `Result` 类型别名，方便在函数签名中使用。
pub type Result<T> = std::result::Result<T, SongHelperError>;
