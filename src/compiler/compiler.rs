//! 规则编译器核心
//! 仅负责将规则集中的型号正则编译为可执行的匹配模式

use std::time::Instant;
use regex::bytes::RegexBuilder;
use tracing::{debug, warn};

use super::pattern::{CompileReport, CompiledDriveModel, CompiledPattern, EntryKind, SkippedEntry};
use crate::config::GlobalConfig;
use crate::error::{RsDriveDbResult, RsDriveDbError};
use crate::rule::{DriveModel, RuleSet};

/// 规则编译器
pub struct RuleCompiler;

impl RuleCompiler {
    /// 编译规则集，保持条目顺序
    ///
    /// 正则无法编译的条目会被丢弃并记录到报告中；
    /// `strict_patterns` 开启时遇到第一个失败即返回错误。
    pub fn compile(
        rule_set: RuleSet,
        config: &GlobalConfig,
    ) -> RsDriveDbResult<(Vec<CompiledDriveModel>, CompileReport)> {
        let start = Instant::now();
        let mut entries = Vec::with_capacity(rule_set.len());
        let mut report = CompileReport::default();

        for (position, model) in rule_set.drives.into_iter().enumerate() {
            let kind = if model.is_placeholder() {
                report.placeholders += 1;
                EntryKind::Placeholder
            } else if model.is_default() {
                EntryKind::Default
            } else {
                match Self::compile_single_pattern(&model, config) {
                    Ok(pattern) => {
                        report.compiled += 1;
                        EntryKind::Model(pattern)
                    }
                    Err(e) if config.strict_patterns => return Err(e),
                    Err(e) => {
                        warn!("第{}条规则（{}）正则无效，已丢弃：{}", position, model.family, e);
                        report.skipped.push(SkippedEntry {
                            position,
                            family: model.family,
                            error: e,
                        });
                        continue;
                    }
                }
            };
            entries.push(CompiledDriveModel { model, kind });
        }

        debug!("✅ 规则编译完成，总耗时{:?}", start.elapsed());
        debug!(
            "📊 编译统计：型号模式{}条、占位条目{}条、丢弃{}条",
            report.compiled,
            report.placeholders,
            report.skipped.len()
        );

        Ok((entries, report))
    }

    /// 编译单个型号正则
    ///
    /// 按字节匹配（关闭 Unicode 模式）：`.` 可匹配任意非换行字节，包括非法 UTF-8 字节。
    fn compile_single_pattern(model: &DriveModel, config: &GlobalConfig) -> RsDriveDbResult<CompiledPattern> {
        let regex = RegexBuilder::new(&model.model_regex)
            .unicode(false)
            .size_limit(config.regex_size_limit)
            .build()
            .map_err(|source| RsDriveDbError::PatternCompileError {
                family: model.family.clone(),
                pattern: model.model_regex.clone(),
                source,
            })?;

        Ok(CompiledPattern::new(regex))
    }
}
