//! 规则加载管理器
//! 负责从本地 YAML 规则文件（及可选缓存）加载规则集，并与内置 DEFAULT 规则组合

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::SystemTime;
use tokio::io::AsyncReadExt;
use tracing::{debug, warn};

use super::cache::RuleCacheManager;
use super::defaults::default_rule_set;
use super::model::{RuleDocument, RuleSet};
use crate::config::GlobalConfig;
use crate::error::RsDriveDbResult;

/// 规则加载管理器
pub struct RuleLoader;

impl RuleLoader {
    /// 打开单个规则文件
    ///
    /// 文件无法打开时返回空规则集（可选配置，软失败）；
    /// 文件存在但内容无法解析时返回错误，不返回部分结果。
    pub fn open_rule_set(path: impl AsRef<Path>) -> RsDriveDbResult<RuleSet> {
        Ok(Self::try_open(path.as_ref())?.unwrap_or_default())
    }

    /// 异步打开单个规则文件，语义同 [`RuleLoader::open_rule_set`]
    pub async fn open_rule_set_async(path: impl AsRef<Path>) -> RsDriveDbResult<RuleSet> {
        Ok(Self::try_open_async(path.as_ref()).await?.unwrap_or_default())
    }

    /// 从 YAML 文本解析规则集，保持文件中的条目顺序
    pub fn parse_str(content: &str) -> RsDriveDbResult<RuleSet> {
        Self::parse_slice(content.as_bytes())
    }

    /// 从 YAML 字节解析规则集
    pub fn parse_slice(content: &[u8]) -> RsDriveDbResult<RuleSet> {
        if content.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(RuleSet::default());
        }
        let doc: RuleDocument = serde_yaml::from_slice(content)?;
        Ok(RuleSet::from(doc))
    }

    /// 按配置加载并组合规则集（同步）
    ///
    /// 组合顺序：内置 DEFAULT（可被文件中的 DEFAULT 替换）→ 全部附加文件 → 第一个可用的主文件
    pub fn load(config: &GlobalConfig) -> RsDriveDbResult<RuleSet> {
        let mut loaded = Vec::new();

        for path in &config.additional_rule_paths {
            match Self::try_open(path)? {
                Some(set) => {
                    debug!("已加载附加规则文件 {}，条目数：{}", path.display(), set.len());
                    loaded.push(set);
                }
                None => debug!("附加规则文件 {} 不可用，跳过", path.display()),
            }
        }

        let mut main = None;
        for path in &config.rule_paths {
            if let Some(set) = Self::try_open(path)? {
                debug!("已加载主规则文件 {}，条目数：{}", path.display(), set.len());
                main = Some(set);
                break;
            }
            debug!("主规则文件 {} 不可用，尝试下一个", path.display());
        }

        Ok(Self::compose(config, loaded, main))
    }

    /// 按配置加载并组合规则集（异步）
    pub async fn load_async(config: &GlobalConfig) -> RsDriveDbResult<RuleSet> {
        let mut loaded = Vec::new();

        for path in &config.additional_rule_paths {
            match Self::try_open_async(path).await? {
                Some(set) => {
                    debug!("已加载附加规则文件 {}，条目数：{}", path.display(), set.len());
                    loaded.push(set);
                }
                None => debug!("附加规则文件 {} 不可用，跳过", path.display()),
            }
        }

        let mut main = None;
        for path in &config.rule_paths {
            if let Some(set) = Self::try_open_async(path).await? {
                debug!("已加载主规则文件 {}，条目数：{}", path.display(), set.len());
                main = Some(set);
                break;
            }
            debug!("主规则文件 {} 不可用，尝试下一个", path.display());
        }

        Ok(Self::compose(config, loaded, main))
    }

    /// 加载规则集（缓存未过期且由相同规则来源生成时优先使用本地缓存，否则读取规则文件并刷新缓存）
    pub async fn load_with_cache(config: &GlobalConfig) -> RsDriveDbResult<RuleSet> {
        let Some(cache_path) = config.cache_path.as_deref() else {
            return Self::load_async(config).await;
        };

        // 1. 优先加载本地缓存
        if Self::cache_is_fresh(config, cache_path).await {
            match RuleCacheManager::load_from_cache(config).await {
                Ok(Some(set)) => {
                    debug!("从本地缓存加载规则集成功，条目数：{}", set.len());
                    return Ok(set);
                }
                Ok(None) => debug!("本地缓存由其他规则来源生成，将重新读取规则文件"),
                Err(e) => warn!("本地缓存损坏，将重新读取规则文件：{}", e),
            }
        } else {
            debug!("本地缓存不存在或已过期，将读取规则文件");
        }

        // 2. 读取规则文件
        let set = Self::load_async(config).await?;

        // 3. 缓存到本地
        if let Err(e) = RuleCacheManager::save_to_cache(config, &set).await {
            warn!("规则集缓存到本地失败：{}", e);
        } else {
            debug!("规则集已缓存到 {}", cache_path.display());
        }

        Ok(set)
    }

    fn compose(config: &GlobalConfig, mut loaded: Vec<RuleSet>, main: Option<RuleSet>) -> RuleSet {
        match main {
            Some(set) => loaded.push(set),
            None if !config.rule_paths.is_empty() => warn!("未找到可用的主规则文件，仅使用附加规则与内置规则"),
            None => {}
        }

        let builtin = config.use_builtin_default.then(default_rule_set);
        let set = RuleSet::compose(builtin, loaded);
        debug!(
            "规则集组合完成，条目数：{}，包含DEFAULT：{}",
            set.len(),
            set.default_entry().is_some()
        );
        set
    }

    // 无法打开返回 Ok(None)，读取或解析失败返回错误
    fn try_open(path: &Path) -> RsDriveDbResult<Option<RuleSet>> {
        let mut file = match File::open(path) {
            Ok(file) => file,
            Err(e) => {
                debug!("规则文件 {} 无法打开：{}", path.display(), e);
                return Ok(None);
            }
        };

        let mut content = Vec::new();
        file.read_to_end(&mut content)?;
        Self::parse_slice(&content)
            .inspect_err(|e| warn!("规则文件 {} 解析失败：{}", path.display(), e))
            .map(Some)
    }

    async fn try_open_async(path: &Path) -> RsDriveDbResult<Option<RuleSet>> {
        let mut file = match tokio::fs::File::open(path).await {
            Ok(file) => file,
            Err(e) => {
                debug!("规则文件 {} 无法打开：{}", path.display(), e);
                return Ok(None);
            }
        };

        let mut content = Vec::new();
        file.read_to_end(&mut content).await?;
        Self::parse_slice(&content)
            .inspect_err(|e| warn!("规则文件 {} 解析失败：{}", path.display(), e))
            .map(Some)
    }

    // 缓存修改时间不早于所有现存规则文件时视为有效
    async fn cache_is_fresh(config: &GlobalConfig, cache_path: &Path) -> bool {
        let Some(cache_mtime) = Self::modified(cache_path).await else {
            return false;
        };

        for source in config.source_paths() {
            if let Some(source_mtime) = Self::modified(source).await {
                if source_mtime > cache_mtime {
                    debug!("规则文件 {} 比缓存新", source.display());
                    return false;
                }
            }
        }
        true
    }

    async fn modified(path: &Path) -> Option<SystemTime> {
        tokio::fs::metadata(path).await.ok()?.modified().ok()
    }
}
