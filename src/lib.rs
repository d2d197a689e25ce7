#![warn(missing_docs)]

//! # Song Helper RS
//!
//! 多平台音乐元数据聚合服务中的提供商适配层：根据歌曲、精选集或专辑 ID
//! 请求上游平台的 HTTP 接口，解析各平台各自的 JSON 结构，
//! 并统一转换为与平台无关的 `SongList`。
//!
//! ## 主要功能
//!
//! - **虾米音乐**: 单曲、以逗号分隔的多首歌曲、精选集和专辑查询。
//! - **缓存**: 单曲查询的原始响应按 (提供商, 请求类型, ID) 缓存，有效期可配置。
//! - **统一的失败语义**: 任何一步失败都得到一个携带错误消息的 `SongList`。
//!
//! ## 获取歌曲
//!
//! ```rust,no_run
//! use song_helper_rs::providers::{Provider, xiami::XiamiClient};
//!
//! async {
//!     let xiami = XiamiClient::new_default().unwrap();
//!
//!     let list = xiami.get_song_list("1769834090,1769834091").await;
//!     match list.error() {
//!         Some(e) => eprintln!("获取失败: {}", e),
//!         None => {
//!             for song in list.songs() {
//!                 println!("{} - {} ({})", song.artists, song.name, song.url);
//!             }
//!         }
//!     }
//! };
//! ```
pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod model;
pub mod providers;

pub use crate::{
    cache::{Cache, MemoryCache, RequestKind},
    config::XiamiConfig,
    error::{Result, SongHelperError},
    http::{Fetcher, ReqwestFetcher},
    model::song::{Song, SongList},
    providers::{Provider, xiami::XiamiClient},
};
