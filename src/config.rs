//! 全局配置管理,存储所有可配置项

use std::path::PathBuf;

/// 系统默认的主规则文件位置（按顺序尝试，取第一个存在的）
pub const DEFAULT_RULE_PATHS: [&str; 3] = [
    "/var/lib/smartmontools/drivedb/drivedb.yaml",
    "/usr/local/share/smartmontools/drivedb.yaml",
    "/usr/share/smartmontools/drivedb.yaml",
];

/// 系统默认的附加规则文件位置
pub const DEFAULT_ADDITIONAL_RULE_PATHS: [&str; 1] = ["/etc/smart_drivedb.yaml"];

/// 全局配置
#[derive(Debug, Clone)]
pub struct GlobalConfig {
    // 主规则文件候选路径
    pub rule_paths: Vec<PathBuf>,
    // 附加规则文件（全部加载，优先级高于主规则文件）
    pub additional_rule_paths: Vec<PathBuf>,
    // 是否合入内置 DEFAULT 规则
    pub use_builtin_default: bool,
    // MessagePack 规则缓存路径，None 表示不使用缓存
    pub cache_path: Option<PathBuf>,
    // 正则编译失败时是否中止加载（否则丢弃该条目并告警）
    pub strict_patterns: bool,
    // 单条正则编译后的大小上限（字节）
    pub regex_size_limit: usize,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            rule_paths: DEFAULT_RULE_PATHS.iter().map(PathBuf::from).collect(),
            additional_rule_paths: DEFAULT_ADDITIONAL_RULE_PATHS.iter().map(PathBuf::from).collect(),
            use_builtin_default: true,
            cache_path: None,
            strict_patterns: false,
            regex_size_limit: 1 << 20,
        }
    }
}

impl GlobalConfig {
    /// 所有配置的规则来源（附加文件在前，主文件在后）
    pub fn source_paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.additional_rule_paths.iter().chain(self.rule_paths.iter())
    }
}

/// 配置管理器
pub struct ConfigManager;

impl ConfigManager {
    /// 获取默认配置
    pub fn get_default() -> GlobalConfig {
        GlobalConfig::default()
    }

    /// 自定义配置
    pub fn custom() -> CustomConfigBuilder {
        CustomConfigBuilder::new()
    }
}

/// 配置构建器（便于自定义配置）
#[derive(Debug, Clone)]
pub struct CustomConfigBuilder {
    config: GlobalConfig,
}

impl Default for CustomConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CustomConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: GlobalConfig::default(),
        }
    }

    /// 替换主规则文件候选列表
    pub fn rule_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.config.rule_paths = paths;
        self
    }

    /// 追加一个主规则文件候选
    pub fn rule_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.rule_paths.push(path.into());
        self
    }

    /// 替换附加规则文件列表
    pub fn additional_rule_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.config.additional_rule_paths = paths;
        self
    }

    pub fn additional_rule_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.additional_rule_paths.push(path.into());
        self
    }

    pub fn use_builtin_default(mut self, enabled: bool) -> Self {
        self.config.use_builtin_default = enabled;
        self
    }

    pub fn cache_path(mut self, path: PathBuf) -> Self {
        self.config.cache_path = Some(path);
        self
    }

    pub fn strict_patterns(mut self, strict: bool) -> Self {
        self.config.strict_patterns = strict;
        self
    }

    pub fn regex_size_limit(mut self, limit: usize) -> Self {
        self.config.regex_size_limit = limit;
        self
    }

    pub fn build(self) -> GlobalConfig {
        self.config
    }
}
