//! 定义了所有提供商共享的、与具体平台无关的歌曲数据模型。
//!
//! 每个 Provider 在获取到各自平台的数据后，都需要把结果转换为 `SongList`，
//! 上层的聚合服务只与这里的类型打交道。

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// 代表一首歌曲的通用模型。
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Song {
    /// 歌曲名。
    pub name: String,
    /// 可播放的音频流地址。
    pub url: String,
    /// 歌词文件地址，可能为空。
    pub lrc_url: String,
    /// 演唱者，多位歌手按上游自身的格式拼接在同一个字符串中。
    pub artists: String,
    /// 提供该歌曲的平台标识，例如 `"xiami"`。
    pub provider: String,
}

/// 有序的歌曲列表，附带整体的成功/失败状态。
///
/// 一旦被标记为失败，列表中的歌曲都不再被视为有效数据：
/// `songs()` 返回空切片，调用方只能通过 `error()` 获取失败原因。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongList {
    songs: Vec<Song>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl SongList {
    /// 创建一个空的、成功状态的列表。
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建一个已失败的列表，并记录错误日志。
    pub fn failed(message: impl Into<String>) -> Self {
        let mut list = Self::new();
        list.set_error(message);
        list
    }

    /// 在列表末尾追加一首歌曲。
    pub fn add_song(&mut self, song: Song) -> &mut Self {
        self.songs.push(song);
        self
    }

    /// 将另一个列表的歌曲按顺序追加到当前列表。
    ///
    /// 如果 `other` 已失败，当前列表也随之失败并沿用其错误消息。
    pub fn concat(&mut self, other: SongList) -> &mut Self {
        match other.error {
            Some(message) => self.error = Some(message),
            None => self.songs.extend(other.songs),
        }
        self
    }

    /// 将列表标记为失败，并以 `error` 级别记录消息。
    pub fn set_error(&mut self, message: impl Into<String>) -> &mut Self {
        let message = message.into();
        tracing::error!("{message}");
        self.error = Some(message);
        self
    }

    /// 列表是否已失败。
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    /// 失败时的错误消息。
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// 有效的歌曲。失败的列表总是返回空切片。
    pub fn songs(&self) -> &[Song] {
        if self.is_failed() { &[] } else { &self.songs }
    }

    /// 有效歌曲的数量。
    pub fn len(&self) -> usize {
        self.songs().len()
    }

    /// 是否没有任何有效歌曲。
    pub fn is_empty(&self) -> bool {
        self.songs().is_empty()
    }

    /// 转换为 `Result`，失败时返回错误消息。
    pub fn into_result(self) -> std::result::Result<Vec<Song>, String> {
        match self.error {
            Some(message) => Err(message),
            None => Ok(self.songs),
        }
    }
}

impl From<Vec<Song>> for SongList {
    fn from(songs: Vec<Song>) -> Self {
        Self { songs, error: None }
    }
}

impl From<Result<Vec<Song>>> for SongList {
    fn from(result: Result<Vec<Song>>) -> Self {
        match result {
            Ok(songs) => songs.into(),
            Err(e) => Self::failed(e.to_string()),
        }
    }
}
