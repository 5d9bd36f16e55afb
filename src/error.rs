//! 全局错误类型定义

use thiserror::Error;
use regex::Error as RegexError;
use serde_yaml::Error as SerdeYamlError;
use std::io::Error as IoError;

#[derive(Error, Debug)]
pub enum RsDriveDbError {
    // 规则相关错误
    #[error("规则解析失败：{0}")]
    RuleParseError(#[from] SerdeYamlError),
    #[error("规则缓存失败：{0}")]
    RuleCacheError(String),

    // 编译相关错误
    #[error("型号正则编译失败（family={family}，pattern={pattern}）：{source}")]
    PatternCompileError {
        family: String,
        pattern: String,
        #[source]
        source: RegexError,
    },

    // 属性描述错误
    #[error("无法解析属性描述：{0}")]
    VendorAttributeError(String),

    // 基础错误
    #[error("IO操作失败：{0}")]
    IoError(#[from] IoError),
}

// 全局Result类型
pub type RsDriveDbResult<T> = Result<T, RsDriveDbError>;
