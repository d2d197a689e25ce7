//! 提供商模块
//!
//! 该模块定义了与 Providers 进行交互的核心抽象。

use async_trait::async_trait;

use crate::{cache::RequestKind, model::song::SongList};

pub mod xiami;

/// 定义了所有音乐平台提供商需要实现的通用接口。
///
/// 所有方法都不返回 `Result`：失败以带错误消息的 `SongList` 表示，
/// 由上层聚合服务决定是否换用其他提供商。
#[async_trait]
pub trait Provider: Send + Sync {
    ///
    /// 返回提供商的唯一名称。
    ///
    /// 一个全小写的静态字符串，例如 `"xiami"`。
    ///
    fn name(&self) -> &'static str;

    ///
    /// 根据歌曲 ID 获取单首歌曲。
    ///
    /// # 参数
    /// * `song_id` - 特定于该提供商的歌曲 ID，首尾空白会被去除。
    ///
    /// # 返回
    /// 成功时恰好包含一首歌曲的 `SongList`。
    ///
    async fn get_song(&self, song_id: &str) -> SongList;

    ///
    /// 按顺序获取以逗号分隔的多首歌曲。
    ///
    /// 任意一首失败即立即返回该失败结果，之前获取的歌曲会被丢弃，
    /// 后续的 ID 不再请求。
    ///
    /// # 参数
    /// * `song_ids` - 以 `,` 分隔的歌曲 ID 列表。
    ///
    async fn get_song_list(&self, song_ids: &str) -> SongList;

    ///
    /// 根据精选集（歌单）ID 获取其中的全部歌曲，保持上游顺序。
    ///
    /// # 参数
    /// * `collect_id` - 精选集 ID。
    ///
    async fn get_collect(&self, collect_id: &str) -> SongList;

    ///
    /// 根据专辑 ID 获取专辑中的全部歌曲。
    ///
    /// 返回的歌曲顺序不固定。
    ///
    /// # 参数
    /// * `album_id` - 专辑 ID。
    ///
    async fn get_album(&self, album_id: &str) -> SongList;

    /// 按请求类型调用对应的入口函数。
    async fn get(&self, kind: RequestKind, id: &str) -> SongList {
        match kind {
            RequestKind::Song => self.get_song(id).await,
            RequestKind::SongList => self.get_song_list(id).await,
            RequestKind::Collect => self.get_collect(id).await,
            RequestKind::Album => self.get_album(id).await,
        }
    }
}
