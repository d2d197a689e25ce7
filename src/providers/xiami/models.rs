//! 此模块定义了所有用于反序列化虾米音乐 API 响应的 `struct` 数据结构。
//!
//! 三个接口的字段名各不相同，但都可以归一化为 `Song`：
//! 响应外层实现 `Envelope`，单条歌曲记录实现 `NormalizeSong`。

use std::collections::HashMap;

use serde::{Deserialize, Deserializer};

use crate::model::song::Song;

/// 上游表示成功的状态值。
pub const RET_OK: &str = "ok";
/// 上游表示失败的状态值。
pub const RET_FAIL: &str = "failed";

/// 将 JSON 中的 `null` 视为默认值，与字段缺失时的行为保持一致。
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// 将上游的单条歌曲记录转换为通用的 `Song`。
pub trait NormalizeSong {
    /// 以 `provider` 作为来源标识生成 `Song`。
    fn into_song(self, provider: &str) -> Song;
}

/// 一种上游响应的外层结构。
pub trait Envelope {
    /// 负载中的歌曲记录类型。
    type Record: NormalizeSong;

    /// 解析失败时错误消息中使用的数据种类描述。
    const KIND: &'static str;

    /// 响应状态。
    fn status(&self) -> &str;

    /// 上游附带的说明。
    fn message(&self) -> &str;

    /// 状态是否为成功。
    fn is_ok(&self) -> bool {
        self.status() == RET_OK
    }

    /// 取出负载中的全部歌曲记录。
    fn into_records(self) -> Vec<Self::Record>;
}

// =================================================================
// 单曲接口 (`/android/song/id/{id}`) 的模型
// =================================================================

/// 单曲接口的顶层响应。
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SongRet {
    /// 状态，`"ok"` 表示成功。
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    /// 失败时的说明。
    #[serde(rename = "msg", deserialize_with = "null_as_default")]
    pub message: String,
    /// 歌曲信息。
    #[serde(deserialize_with = "null_as_default")]
    pub song: XiamiSong,
}

/// 单曲接口中的歌曲信息。
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct XiamiSong {
    /// 歌曲名。
    #[serde(rename = "song_name")]
    pub name: String,
    /// 音频地址。
    #[serde(rename = "song_location")]
    pub location: String,
    /// 歌词地址。
    #[serde(rename = "song_lrc")]
    pub lyric: String,
    /// 歌手名。
    #[serde(rename = "artist_name")]
    pub artist: String,
}

impl XiamiSong {
    /// 所有字段是否都为空。无效的歌曲 ID 也会得到 `"ok"` 状态和这样一条空记录。
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl NormalizeSong for XiamiSong {
    fn into_song(self, provider: &str) -> Song {
        Song {
            name: self.name,
            url: self.location,
            lrc_url: self.lyric,
            artists: self.artist,
            provider: provider.to_string(),
        }
    }
}

impl Envelope for SongRet {
    type Record = XiamiSong;
    const KIND: &'static str = "song info";

    fn status(&self) -> &str {
        &self.status
    }

    fn message(&self) -> &str {
        &self.message
    }

    fn into_records(self) -> Vec<XiamiSong> {
        vec![self.song]
    }
}

// =================================================================
// 精选集与专辑接口共用的歌曲记录
// =================================================================

/// 精选集与专辑接口中的歌曲记录。
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CollectSong {
    /// 歌曲名。
    pub name: String,
    /// 音频地址。
    pub location: String,
    /// 歌词地址。
    pub lyric: String,
    /// 歌手名。
    pub singers: String,
}

impl NormalizeSong for CollectSong {
    fn into_song(self, provider: &str) -> Song {
        Song {
            name: self.name,
            url: self.location,
            lrc_url: self.lyric,
            artists: self.singers,
            provider: provider.to_string(),
        }
    }
}

// =================================================================
// 精选集接口 (`/android/collect?id={id}`) 的模型
// =================================================================

/// 精选集接口的顶层响应。
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CollectRet {
    /// 状态，`"ok"` 表示成功。
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    /// 失败时的说明。
    #[serde(rename = "msg", deserialize_with = "null_as_default")]
    pub message: String,
    /// 精选集内容。
    #[serde(deserialize_with = "null_as_default")]
    pub collect: Collect,
}

/// 精选集内容。
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Collect {
    /// 按上游顺序排列的歌曲。
    #[serde(deserialize_with = "null_as_default")]
    pub songs: Vec<CollectSong>,
}

impl Envelope for CollectRet {
    type Record = CollectSong;
    const KIND: &'static str = "collect data";

    fn status(&self) -> &str {
        &self.status
    }

    fn message(&self) -> &str {
        &self.message
    }

    fn into_records(self) -> Vec<CollectSong> {
        self.collect.songs
    }
}

// =================================================================
// 专辑接口 (`/iphone/album/id/{id}`) 的模型
// =================================================================

/// 专辑接口的顶层响应。`album` 是一个以不透明字符串为键的歌曲映射。
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AlbumRet {
    /// 状态，`"ok"` 表示成功。
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    /// 失败时的说明。
    #[serde(rename = "msg", deserialize_with = "null_as_default")]
    pub message: String,
    /// 专辑中的歌曲。
    #[serde(deserialize_with = "null_as_default")]
    pub album: HashMap<String, CollectSong>,
}

impl Envelope for AlbumRet {
    type Record = CollectSong;
    const KIND: &'static str = "album data";

    fn status(&self) -> &str {
        &self.status
    }

    fn message(&self) -> &str {
        &self.message
    }

    fn into_records(self) -> Vec<CollectSong> {
        self.album.into_values().collect()
    }
}
