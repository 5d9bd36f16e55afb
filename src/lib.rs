//! rsdrivedb - 硬盘型号数据库查询工具
//! 根据 ATA IDENTIFY 返回的型号字符串匹配厂商规则，并与默认 SMART 属性规则合并

// 导出全局错误类型
pub use self::error::{RsDriveDbError, RsDriveDbResult};

// 导出配置模块
pub use self::config::{GlobalConfig, ConfigManager, CustomConfigBuilder};

// 导出规则模块核心接口
pub use self::rule::{
    AttrConv, DriveModel, RuleSet, RuleLoader, RuleCacheManager, CacheKey,
    default_rule_set, DEFAULT_FAMILY, PLACEHOLDER_MARKER
};

// 导出编译模块核心接口
pub use self::compiler::{
    CompiledDriveModel, CompiledPattern, CompileReport, EntryKind, RuleCompiler, SkippedEntry
};

// 导出查询模块核心接口
pub use self::resolver::{DriveDb, ResolvedModel, SharedDriveDb, resolve};

// 导出工具模块核心接口
pub use self::utils::{DriveType, VendorAttribute};

// 声明所有子模块
pub mod config;
pub mod error;
pub mod rule;
pub mod compiler;
pub mod resolver;
pub mod utils;
