//! 规则模块：负责规则的加载、缓存、数据模型定义
pub mod model;
pub mod defaults;
pub mod cache;
pub mod loader;

// 导出核心接口
pub use self::model::{AttrConv, DriveModel, RuleSet, DEFAULT_FAMILY, PLACEHOLDER_MARKER};
pub use self::defaults::{default_rule_set, default_drive_model};
pub use self::loader::RuleLoader;
pub use self::cache::{CacheKey, RuleCacheManager};
