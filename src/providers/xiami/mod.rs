//! 此模块实现了与虾米音乐平台进行交互的 `Provider`。
//!
//! 单曲查询会读写缓存；精选集与专辑查询每次都直接请求上游。

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::{
    cache::{Cache, MemoryCache},
    config::XiamiConfig,
    error::{Result, SongHelperError},
    http::{Fetcher, ReqwestFetcher},
    model::song::{Song, SongList},
    providers::Provider,
};

pub mod models;

use models::{AlbumRet, CollectRet, Envelope, NormalizeSong, SongRet};

/// 提供商标识。
pub const PROVIDER_NAME: &str = "xiami";

const SONG_ID_SEPARATOR: char = ',';
const SONG_PATH: &str = "/android/song/id/";
const ALBUM_PATH: &str = "/iphone/album/id/";
const COLLECT_PATH: &str = "/android/collect?id=";

/// 虾米音乐的客户端实现。
///
/// 缓存与 HTTP 抓取都通过构造时传入的句柄完成，不依赖任何全局状态。
#[derive(Clone)]
pub struct XiamiClient {
    config: XiamiConfig,
    cache: Arc<dyn Cache>,
    fetcher: Arc<dyn Fetcher>,
}

impl XiamiClient {
    /// 使用给定的配置、缓存与抓取器创建实例。
    pub fn new(config: XiamiConfig, cache: Arc<dyn Cache>, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            config,
            cache,
            fetcher,
        }
    }

    /// 一个便捷的默认构造函数，使用进程内缓存与 `reqwest` 抓取器。
    pub fn new_default() -> Result<Self> {
        Self::with_config(XiamiConfig::default())
    }

    /// 使用给定配置，搭配进程内缓存与 `reqwest` 抓取器。
    pub fn with_config(config: XiamiConfig) -> Result<Self> {
        let fetcher = ReqwestFetcher::new(config.request_timeout())?;
        Ok(Self::new(
            config,
            Arc::new(MemoryCache::new()),
            Arc::new(fetcher),
        ))
    }

    /// 当前配置。
    pub fn config(&self) -> &XiamiConfig {
        &self.config
    }

    fn build_url(&self, path: &str, id: &str) -> String {
        format!("{}{}{}", self.config.base_url, path, id)
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        debug!(url, "请求虾米接口");
        self.fetcher
            .get(url)
            .await
            .map_err(|e| SongHelperError::Network {
                url: url.to_string(),
                source: Box::new(e),
            })
    }

    /// 解析响应并校验状态。
    fn decode<E: Envelope + DeserializeOwned>(url: &str, body: &[u8]) -> Result<E> {
        let envelope: E = serde_json::from_slice(body).map_err(|source| SongHelperError::Parse {
            kind: E::KIND,
            url: url.to_string(),
            source,
        })?;

        if !envelope.is_ok() {
            return Err(SongHelperError::ApiError {
                url: url.to_string(),
                message: envelope.message().to_string(),
            });
        }

        Ok(envelope)
    }

    fn normalize<R: NormalizeSong>(records: Vec<R>) -> Vec<Song> {
        records
            .into_iter()
            .map(|record| record.into_song(PROVIDER_NAME))
            .collect()
    }

    async fn fetch_song(&self, song_id: &str) -> Result<Song> {
        let song_id = song_id.trim();
        let url = self.build_url(SONG_PATH, song_id);

        let body = match self
            .cache
            .get(PROVIDER_NAME, self.config.cache_read_kind, song_id)
        {
            Some(cached) => {
                debug!(song_id, kind = %self.config.cache_read_kind, "命中缓存");
                cached
            }
            None => {
                let body = self.fetch(&url).await?;
                self.cache.set(
                    PROVIDER_NAME,
                    self.config.cache_write_kind,
                    song_id,
                    self.config.cache_expiration(),
                    body.clone(),
                );
                body
            }
        };

        let ret: SongRet = Self::decode(&url, &body)?;
        let song = ret
            .into_records()
            .into_iter()
            .next()
            .filter(|song| !song.is_empty())
            .ok_or_else(|| SongHelperError::InvalidSongId(song_id.to_string()))?;

        Ok(song.into_song(PROVIDER_NAME))
    }

    async fn fetch_collect(&self, collect_id: &str) -> Result<Vec<Song>> {
        let url = self.build_url(COLLECT_PATH, collect_id.trim());
        let body = self.fetch(&url).await?;
        let ret: CollectRet = Self::decode(&url, &body)?;
        Ok(Self::normalize(ret.into_records()))
    }

    async fn fetch_album(&self, album_id: &str) -> Result<Vec<Song>> {
        let url = self.build_url(ALBUM_PATH, album_id.trim());
        let body = self.fetch(&url).await?;
        let ret: AlbumRet = Self::decode(&url, &body)?;
        Ok(Self::normalize(ret.into_records()))
    }
}

#[async_trait]
impl Provider for XiamiClient {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    #[instrument(skip(self))]
    async fn get_song(&self, song_id: &str) -> SongList {
        self.fetch_song(song_id).await.map(|song| vec![song]).into()
    }

    #[instrument(skip(self))]
    async fn get_song_list(&self, song_ids: &str) -> SongList {
        let mut list = SongList::new();
        for song_id in song_ids.split(SONG_ID_SEPARATOR) {
            let single = self.get_song(song_id.trim()).await;
            if single.is_failed() {
                return single;
            }
            list.concat(single);
        }
        list
    }

    #[instrument(skip(self))]
    async fn get_collect(&self, collect_id: &str) -> SongList {
        self.fetch_collect(collect_id).await.into()
    }

    #[instrument(skip(self))]
    async fn get_album(&self, album_id: &str) -> SongList {
        self.fetch_album(album_id).await.into()
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        sync::{
            Mutex,
            atomic::{AtomicUsize, Ordering},
        },
    };

    use super::*;
    use crate::cache::RequestKind;

    const BASE: &str = "http://mock.xiami/app";

    /// 按 URL 返回预设响应的抓取器，未预设的 URL 视为网络错误。
    #[derive(Default)]
    struct MockFetcher {
        responses: HashMap<String, String>,
        calls: AtomicUsize,
        requested: Mutex<Vec<String>>,
    }

    impl MockFetcher {
        fn with(mut self, url: &str, body: &str) -> Self {
            self.responses.insert(url.to_string(), body.to_string());
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Fetcher for MockFetcher {
        async fn get(&self, url: &str) -> Result<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requested.lock().unwrap().push(url.to_string());
            self.responses
                .get(url)
                .map(|body| body.clone().into_bytes())
                .ok_or_else(|| SongHelperError::Internal("connection refused".to_string()))
        }
    }

    fn song_json(id: &str) -> String {
        format!(
            r#"{{"status":"ok","msg":"","song":{{"song_name":"歌曲{id}","song_location":"http://m.xiami/{id}.mp3","song_lrc":"http://m.xiami/{id}.lrc","artist_name":"歌手{id}"}}}}"#
        )
    }

    fn song_url(id: &str) -> String {
        format!("{BASE}{SONG_PATH}{id}")
    }

    fn client(fetcher: Arc<MockFetcher>) -> (XiamiClient, Arc<MemoryCache>) {
        client_with(fetcher, XiamiConfig::default())
    }

    fn client_with(
        fetcher: Arc<MockFetcher>,
        config: XiamiConfig,
    ) -> (XiamiClient, Arc<MemoryCache>) {
        let cache = Arc::new(MemoryCache::new());
        let config = XiamiConfig {
            base_url: BASE.to_string(),
            ..config
        };
        (XiamiClient::new(config, cache.clone(), fetcher), cache)
    }

    fn init_tracing() {
        use tracing_subscriber::{EnvFilter, FmtSubscriber};
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info,song_helper_rs=trace"));
        let _ = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    }

    #[tokio::test]
    async fn test_get_song_maps_fields_verbatim() {
        init_tracing();
        let fetcher = Arc::new(MockFetcher::default().with(&song_url("1"), &song_json("1")));
        let (client, _) = client(fetcher);

        let list = client.get_song("  1 ").await;

        assert!(!list.is_failed(), "{:?}", list.error());
        assert_eq!(
            list.songs(),
            [Song {
                name: "歌曲1".to_string(),
                url: "http://m.xiami/1.mp3".to_string(),
                lrc_url: "http://m.xiami/1.lrc".to_string(),
                artists: "歌手1".to_string(),
                provider: "xiami".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_get_song_writes_cache_under_write_kind() {
        let fetcher = Arc::new(MockFetcher::default().with(&song_url("1"), &song_json("1")));
        let (client, cache) = client(fetcher.clone());

        client.get_song(" 1 ").await;

        assert_eq!(
            cache.get(PROVIDER_NAME, RequestKind::Song, "1"),
            Some(song_json("1").into_bytes())
        );
        assert!(cache.get(PROVIDER_NAME, RequestKind::SongList, "1").is_none());

        // 读写使用不同的请求类型，第二次调用仍会请求上游
        client.get_song("1").await;
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn test_get_song_served_from_cache_when_kinds_match() {
        let fetcher = Arc::new(MockFetcher::default().with(&song_url("1"), &song_json("1")));
        let config = XiamiConfig {
            cache_read_kind: RequestKind::Song,
            cache_write_kind: RequestKind::Song,
            ..Default::default()
        };
        let (client, _) = client_with(fetcher.clone(), config);

        let first = client.get_song("1").await;
        let second = client.get_song("1").await;

        assert_eq!(first, second);
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_get_song_reads_preloaded_cache() {
        let fetcher = Arc::new(MockFetcher::default());
        let (client, cache) = client(fetcher.clone());
        cache.set(
            PROVIDER_NAME,
            RequestKind::SongList,
            "7",
            std::time::Duration::from_secs(60),
            song_json("7").into_bytes(),
        );

        let list = client.get_song("7").await;

        assert_eq!(list.len(), 1);
        assert_eq!(list.songs()[0].name, "歌曲7");
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_get_song_failed_status() {
        let fetcher = Arc::new(
            MockFetcher::default().with(&song_url("1"), r#"{"status":"failed","msg":"歌曲已下架"}"#),
        );
        let (client, _) = client(fetcher);

        let list = client.get_song("1").await;

        assert!(list.is_failed());
        assert_eq!(
            list.error(),
            Some(format!("error getting url {}: 歌曲已下架", song_url("1")).as_str())
        );
    }

    #[tokio::test]
    async fn test_get_song_empty_record_is_invalid_id() {
        let fetcher = Arc::new(MockFetcher::default().with(
            &song_url("0"),
            r#"{"status":"ok","msg":"","song":{"song_name":"","song_location":"","song_lrc":"","artist_name":""}}"#,
        ));
        let (client, _) = client(fetcher);

        let list = client.get_song("0").await;

        assert_eq!(list.error(), Some("invalid song id 0"));
    }

    #[tokio::test]
    async fn test_get_song_malformed_json() {
        let fetcher = Arc::new(MockFetcher::default().with(&song_url("1"), "<html>"));
        let (client, _) = client(fetcher);

        let list = client.get_song("1").await;

        let message = list.error().unwrap();
        assert!(message.starts_with(&format!(
            "error parsing song info from url {}: ",
            song_url("1")
        )));
    }

    #[tokio::test]
    async fn test_get_song_with_unbounded_cache_expiration() {
        let fetcher = Arc::new(MockFetcher::default().with(&song_url("1"), &song_json("1")));
        let config: XiamiConfig =
            serde_json::from_str(r#"{"cache_expiration_secs":18446744073709551615}"#).unwrap();
        let (client, cache) = client_with(fetcher, config);

        let list = client.get_song("1").await;

        assert_eq!(list.len(), 1, "{:?}", list.error());
        assert!(cache.get(PROVIDER_NAME, RequestKind::Song, "1").is_some());
    }

    #[tokio::test]
    async fn test_collect_and_album_failed_status() {
        let collect_url = format!("{BASE}{COLLECT_PATH}1");
        let album_url = format!("{BASE}{ALBUM_PATH}2");
        let fetcher = Arc::new(
            MockFetcher::default()
                .with(&collect_url, r#"{"status":"failed","msg":"精选集不存在"}"#)
                .with(&album_url, r#"{"status":"failed","msg":"专辑不存在"}"#),
        );
        let (client, _) = client(fetcher);

        let collect = client.get_collect("1").await;
        assert_eq!(
            collect.error(),
            Some(format!("error getting url {collect_url}: 精选集不存在").as_str())
        );

        let album = client.get_album("2").await;
        assert_eq!(
            album.error(),
            Some(format!("error getting url {album_url}: 专辑不存在").as_str())
        );
    }

    #[tokio::test]
    async fn test_collect_and_album_malformed_json() {
        let collect_url = format!("{BASE}{COLLECT_PATH}1");
        let album_url = format!("{BASE}{ALBUM_PATH}2");
        let fetcher = Arc::new(
            MockFetcher::default()
                .with(&collect_url, r#"{"status":"ok","collect":{"songs":"oops"}}"#)
                .with(&album_url, r#"{"status":"ok","album":[]}"#),
        );
        let (client, _) = client(fetcher);

        let collect = client.get_collect("1").await;
        assert!(
            collect
                .error()
                .unwrap()
                .starts_with(&format!("error parsing collect data from url {collect_url}: ")),
            "{:?}",
            collect.error()
        );

        let album = client.get_album("2").await;
        assert!(
            album
                .error()
                .unwrap()
                .starts_with(&format!("error parsing album data from url {album_url}: ")),
            "{:?}",
            album.error()
        );
    }

    #[tokio::test]
    async fn test_get_song_list_preserves_order() {
        let fetcher = Arc::new(
            MockFetcher::default()
                .with(&song_url("1"), &song_json("1"))
                .with(&song_url("2"), &song_json("2"))
                .with(&song_url("3"), &song_json("3")),
        );
        let (client, _) = client(fetcher);

        let list = client.get_song_list("1, 2 ,3").await;

        let names: Vec<_> = list.songs().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["歌曲1", "歌曲2", "歌曲3"]);
    }

    #[tokio::test]
    async fn test_get_song_list_fails_fast() {
        let fetcher = Arc::new(
            MockFetcher::default()
                .with(&song_url("1"), &song_json("1"))
                .with(&song_url("3"), &song_json("3")),
        );
        let (client, _) = client(fetcher.clone());

        let list = client.get_song_list("1,bad,3").await;
        let alone = client.get_song("bad").await;

        assert!(list.is_failed());
        assert!(list.is_empty());
        assert_eq!(list, alone);
        // "1"、"bad" 各一次，加上单独调用的 "bad"
        assert_eq!(fetcher.calls(), 3);
        assert!(
            !fetcher
                .requested
                .lock()
                .unwrap()
                .contains(&song_url("3"))
        );
    }

    #[tokio::test]
    async fn test_get_collect_keeps_upstream_order() {
        let url = format!("{BASE}{COLLECT_PATH}42");
        let body = r#"{"status":"ok","msg":"","collect":{"songs":[
            {"name":"乙","location":"l2","lyric":"","singers":"B"},
            {"name":"甲","location":"l1","lyric":"r1","singers":"A;C"}
        ]}}"#;
        let fetcher = Arc::new(MockFetcher::default().with(&url, body));
        let (client, cache) = client(fetcher);

        let list = client.get_collect(" 42 ").await;

        let names: Vec<_> = list.songs().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["乙", "甲"]);
        assert_eq!(list.songs()[1].artists, "A;C");
        assert_eq!(list.songs()[1].lrc_url, "r1");
        assert!(list.songs().iter().all(|s| s.provider == PROVIDER_NAME));
        assert!(cache.is_empty(), "精选集查询不应写入缓存");
    }

    #[tokio::test]
    async fn test_get_album_empty_map_is_success() {
        let url = format!("{BASE}{ALBUM_PATH}9");
        let fetcher = Arc::new(MockFetcher::default().with(&url, r#"{"status":"ok","album":{}}"#));
        let (client, _) = client(fetcher);

        let list = client.get_album("9").await;

        assert!(!list.is_failed());
        assert!(list.is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_names_url_for_every_entry_point() {
        let fetcher = Arc::new(MockFetcher::default());
        let (client, _) = client(fetcher);

        let cases = [
            (client.get_song("1").await, song_url("1")),
            (client.get_song_list("2,3").await, song_url("2")),
            (client.get_collect("4").await, format!("{BASE}{COLLECT_PATH}4")),
            (client.get_album("5").await, format!("{BASE}{ALBUM_PATH}5")),
        ];

        for (list, url) in cases {
            assert_eq!(list.error(), Some(format!("error accessing url {url}").as_str()));
        }
    }

    #[tokio::test]
    async fn test_get_routes_by_kind() {
        let url = format!("{BASE}{ALBUM_PATH}9");
        let fetcher = Arc::new(
            MockFetcher::default()
                .with(&url, r#"{"status":"ok","album":{}}"#)
                .with(&song_url("1"), &song_json("1")),
        );
        let (client, _) = client(fetcher.clone());

        assert_eq!(client.get(RequestKind::Song, "1").await.len(), 1);
        assert!(!client.get(RequestKind::Album, "9").await.is_failed());
        assert_eq!(fetcher.calls(), 2);
    }
}
