//! 规则缓存管理
//! 仅处理组合后规则集的本地序列化（MessagePack）和反序列化
//!
//! 缓存中除规则集外还记录生成它的输入（规则文件路径与内置 DEFAULT 开关），
//! 读取时输入与当前配置不一致即视为失效。

use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::model::RuleSet;
use crate::error::{RsDriveDbResult, RsDriveDbError};
use crate::config::GlobalConfig;

/// 生成规则集的输入
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheKey {
    /// 主规则文件候选（规范化路径）
    pub rule_paths: Vec<PathBuf>,
    /// 附加规则文件（规范化路径）
    pub additional_rule_paths: Vec<PathBuf>,
    /// 实际可用的规则文件：全部存在的附加文件 + 第一个存在的主文件
    pub used_sources: Vec<PathBuf>,
    pub use_builtin_default: bool,
}

impl CacheKey {
    /// 按当前配置与文件系统状态计算
    pub async fn current(config: &GlobalConfig) -> Self {
        let mut additional_rule_paths = Vec::with_capacity(config.additional_rule_paths.len());
        let mut used_sources = Vec::new();
        for path in &config.additional_rule_paths {
            let canonical = canonical_path(path).await;
            if is_file(&canonical).await {
                used_sources.push(canonical.clone());
            }
            additional_rule_paths.push(canonical);
        }

        let mut rule_paths = Vec::with_capacity(config.rule_paths.len());
        let mut main_found = false;
        for path in &config.rule_paths {
            let canonical = canonical_path(path).await;
            if !main_found && is_file(&canonical).await {
                used_sources.push(canonical.clone());
                main_found = true;
            }
            rule_paths.push(canonical);
        }

        Self {
            rule_paths,
            additional_rule_paths,
            used_sources,
            use_builtin_default: config.use_builtin_default,
        }
    }
}

// 缓存文件内容
#[derive(Debug, Serialize, Deserialize)]
struct CachedRuleSet {
    key: CacheKey,
    rule_set: RuleSet,
}

/// 规则缓存管理器
pub struct RuleCacheManager;

impl RuleCacheManager {
    /// 从本地缓存加载规则集
    ///
    /// 缓存的生成输入与当前配置不一致时返回 `Ok(None)`。
    pub async fn load_from_cache(config: &GlobalConfig) -> RsDriveDbResult<Option<RuleSet>> {
        let cache_path = Self::cache_path(config)?;
        let cache_data = tokio::fs::read(cache_path).await?;

        // MessagePack反序列化
        let cached: CachedRuleSet = rmp_serde::from_slice(&cache_data)
            .map_err(|e| RsDriveDbError::RuleCacheError(format!("反序列化失败：{}", e)))?;

        let key = CacheKey::current(config).await;
        if cached.key != key {
            debug!("缓存输入与当前配置不一致：缓存 {:?}，当前 {:?}", cached.key, key);
            return Ok(None);
        }

        debug!("缓存文件反序列化成功，规则条目数：{}", cached.rule_set.len());

        Ok(Some(cached.rule_set))
    }

    /// 将规则集连同当前配置的输入一起缓存到本地
    pub async fn save_to_cache(config: &GlobalConfig, rule_set: &RuleSet) -> RsDriveDbResult<()> {
        let cache_path = Self::cache_path(config)?;
        let cached = CachedRuleSet {
            key: CacheKey::current(config).await,
            rule_set: rule_set.clone(),
        };

        // MessagePack序列化（带字段名，便于字段增减后兼容）
        let cache_data = rmp_serde::to_vec_named(&cached)
            .map_err(|e| RsDriveDbError::RuleCacheError(format!("序列化失败：{}", e)))?;

        debug!("规则集序列化成功，序列化后数据大小：{} 字节", cache_data.len());

        if let Some(parent) = cache_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(cache_path, cache_data).await?;
        Ok(())
    }

    /// 清除本地缓存
    pub async fn clear_cache(config: &GlobalConfig) -> RsDriveDbResult<()> {
        let cache_path = Self::cache_path(config)?;
        if tokio::fs::try_exists(cache_path).await? {
            tokio::fs::remove_file(cache_path).await?;
        }
        Ok(())
    }

    fn cache_path(config: &GlobalConfig) -> RsDriveDbResult<&Path> {
        config
            .cache_path
            .as_deref()
            .ok_or_else(|| RsDriveDbError::RuleCacheError("未配置缓存路径".to_string()))
    }
}

// 不存在的路径无法规范化，保持原样
async fn canonical_path(path: &Path) -> PathBuf {
    tokio::fs::canonicalize(path).await.unwrap_or_else(|_| path.to_path_buf())
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path).await.map(|m| m.is_file()).unwrap_or(false)
}
