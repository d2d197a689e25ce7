//! 负责处理提供商的配置及其持久化。

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    cache::RequestKind,
    error::{Result, SongHelperError},
};

const CONFIG_DIR_NAME: &str = "song-helper";
const XIAMI_CONFIG_FILE: &str = "xiami_config.json";

/// 虾米音乐提供商的配置项。
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct XiamiConfig {
    /// API 根地址，所有请求路径都拼接在其后。
    pub base_url: String,
    /// 单曲响应的缓存有效期（秒）。
    pub cache_expiration_secs: u64,
    /// 单曲查询读取缓存时使用的请求类型。
    pub cache_read_kind: RequestKind,
    /// 单曲查询写入缓存时使用的请求类型。
    ///
    /// 默认与 `cache_read_kind` 不同，因此单曲查询永远不会命中自己写入的缓存。
    pub cache_write_kind: RequestKind,
    /// HTTP 请求超时（秒），`None` 表示不设置。
    pub request_timeout_secs: Option<u64>,
}

impl Default for XiamiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://www.xiami.com/app".to_string(),
            cache_expiration_secs: 3600,
            cache_read_kind: RequestKind::SongList,
            cache_write_kind: RequestKind::Song,
            request_timeout_secs: None,
        }
    }
}

impl XiamiConfig {
    /// 缓存有效期。
    pub fn cache_expiration(&self) -> Duration {
        Duration::from_secs(self.cache_expiration_secs)
    }

    /// HTTP 请求超时。
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// 获取应用配置目录下指定文件的完整路径。
///
/// # 参数
/// * `filename` - 目标配置文件的名称，例如 "xiami_config.json"。
pub(crate) fn get_config_file_path(filename: &str) -> Result<PathBuf> {
    let mut config_dir = dirs::config_dir()
        .ok_or_else(|| SongHelperError::Internal("无法找到用户配置目录".to_string()))?;
    config_dir.push(CONFIG_DIR_NAME);
    fs::create_dir_all(&config_dir)?;
    config_dir.push(filename);
    Ok(config_dir)
}

/// 从指定路径加载配置。文件不存在时返回默认配置。
pub fn load_config_from(path: &Path) -> Result<XiamiConfig> {
    match fs::read_to_string(path) {
        Ok(content) => {
            let config: XiamiConfig = serde_json::from_str(&content)?;
            info!("已从 {} 加载虾米配置。", path.display());
            Ok(config)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("虾米配置文件不存在，将使用默认配置。");
            Ok(XiamiConfig::default())
        }
        Err(e) => Err(e.into()),
    }
}

/// 将配置序列化为 JSON 并保存到指定路径。
pub fn save_config_to(config: &XiamiConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(config)?;
    fs::write(path, content)?;
    info!("虾米配置已保存到 {}。", path.display());
    Ok(())
}

/// 从用户配置目录加载虾米音乐的配置。
pub fn load_xiami_config() -> Result<XiamiConfig> {
    load_config_from(&get_config_file_path(XIAMI_CONFIG_FILE)?)
}

/// 将虾米音乐的配置保存到用户配置目录。
pub fn save_xiami_config(config: &XiamiConfig) -> Result<()> {
    save_config_to(config, &get_config_file_path(XIAMI_CONFIG_FILE)?)
}
