//! 编译后模式模型
//! 型号正则编译后的结构

use regex::bytes::Regex;

use crate::error::RsDriveDbError;
use crate::rule::DriveModel;

/// 编译后的型号匹配模式
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    regex: Regex,
}

impl CompiledPattern {
    pub(crate) fn new(regex: Regex) -> Self {
        Self { regex }
    }

    /// 对原始 IDENTIFY 数据做非锚定匹配
    pub fn is_match(&self, ident: &[u8]) -> bool {
        self.regex.is_match(ident)
    }

    /// 正则源文本
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

/// 条目类别
#[derive(Debug, Clone)]
pub enum EntryKind {
    /// DEFAULT 基线，不参与匹配
    Default,
    /// 占位/注释条目，查询时跳过
    Placeholder,
    /// 普通型号条目
    Model(CompiledPattern),
}

/// 编译后的规则条目
#[derive(Debug, Clone)]
pub struct CompiledDriveModel {
    pub model: DriveModel,
    pub kind: EntryKind,
}

impl CompiledDriveModel {
    pub fn pattern(&self) -> Option<&CompiledPattern> {
        match &self.kind {
            EntryKind::Model(pattern) => Some(pattern),
            _ => None,
        }
    }
}

/// 被丢弃的条目
#[derive(Debug)]
pub struct SkippedEntry {
    /// 条目在规则集中的位置
    pub position: usize,
    pub family: String,
    pub error: RsDriveDbError,
}

/// 编译报告
#[derive(Debug, Default)]
pub struct CompileReport {
    pub compiled: usize,
    pub placeholders: usize,
    pub skipped: Vec<SkippedEntry>,
}

impl CompileReport {
    pub fn has_skipped(&self) -> bool {
        !self.skipped.is_empty()
    }
}
