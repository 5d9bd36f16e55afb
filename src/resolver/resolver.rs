//! 型号数据库核心：按顺序匹配型号条目，并与 DEFAULT 基线合并
use tracing::debug;

use super::resolved::{merge_preset, ResolvedModel};
use crate::compiler::{CompileReport, CompiledDriveModel, EntryKind, RuleCompiler};
use crate::config::GlobalConfig;
use crate::error::RsDriveDbResult;
use crate::rule::{RuleLoader, RuleSet};

/// 按顺序在编译后的条目中查找型号，并与 DEFAULT 基线合并
///
/// 第一个匹配的条目生效，其后的条目（包括排在后面的 DEFAULT）不再参与；
/// 未命中时返回 DEFAULT 基线本身。条目数据只读，结果为独立分配的新值。
pub fn resolve(entries: &[CompiledDriveModel], ident: &[u8]) -> ResolvedModel {
    let mut resolved = ResolvedModel::default();

    for entry in entries {
        match &entry.kind {
            EntryKind::Placeholder => continue,
            EntryKind::Default => {
                resolved.presets = entry.model.presets.clone();
            }
            EntryKind::Model(pattern) => {
                if !pattern.is_match(ident) {
                    continue;
                }

                let model = &entry.model;
                resolved.family = model.family.clone();
                resolved.model_regex = model.model_regex.clone();
                resolved.firmware_regex = model.firmware_regex.clone();
                resolved.warning = model.warning.clone();
                resolved.matcher = Some(pattern.clone());

                for (id, conv) in &model.presets {
                    merge_preset(&mut resolved.presets, id.clone(), conv.clone());
                }
                break;
            }
        }
    }

    resolved
}

/// 编译后的型号数据库
///
/// 构建后只读，可在多线程间共享并发查询。
#[derive(Debug, Default)]
pub struct DriveDb {
    entries: Vec<CompiledDriveModel>,
    report: CompileReport,
}

impl DriveDb {
    /// 编译内存中的规则集
    pub fn new(rule_set: RuleSet, config: &GlobalConfig) -> RsDriveDbResult<Self> {
        let (entries, report) = RuleCompiler::compile(rule_set, config)?;
        Ok(Self { entries, report })
    }

    /// 按配置加载规则文件并编译
    pub fn open(config: &GlobalConfig) -> RsDriveDbResult<Self> {
        let rule_set = RuleLoader::load(config)?;
        Self::new(rule_set, config)
    }

    /// 异步加载（配置了缓存时优先使用缓存）并编译
    pub async fn open_async(config: &GlobalConfig) -> RsDriveDbResult<Self> {
        let rule_set = RuleLoader::load_with_cache(config).await?;
        Self::new(rule_set, config)
    }

    /// 根据 ATA IDENTIFY 中的型号数据查询合并后的规则
    pub fn lookup_drive(&self, ident: &[u8]) -> ResolvedModel {
        let resolved = resolve(&self.entries, ident);
        if resolved.is_matched() {
            debug!("型号匹配成功：{}", resolved.family);
        }
        resolved
    }

    pub fn entries(&self) -> &[CompiledDriveModel] {
        &self.entries
    }

    /// 编译报告（包含被丢弃的无效条目）
    pub fn report(&self) -> &CompileReport {
        &self.report
    }

    /// 按优先级列出非占位条目的 family
    pub fn families(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|e| !matches!(e.kind, EntryKind::Placeholder))
            .map(|e| e.model.family.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigManager;
    use crate::rule::{default_rule_set, AttrConv, DriveModel};
    use std::collections::HashMap;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn presets(items: &[(&str, &str, &str)]) -> HashMap<String, AttrConv> {
        items
            .iter()
            .map(|&(id, conv, name)| (id.to_string(), AttrConv::new(conv, name)))
            .collect()
    }

    fn default_entry(items: &[(&str, &str, &str)]) -> DriveModel {
        DriveModel {
            family: "DEFAULT".to_string(),
            presets: presets(items),
            ..Default::default()
        }
    }

    fn model_entry(family: &str, regex: &str, items: &[(&str, &str, &str)]) -> DriveModel {
        DriveModel {
            family: family.to_string(),
            model_regex: regex.to_string(),
            firmware_regex: format!("{family}-fw"),
            warning: format!("{family}-warning"),
            presets: presets(items),
        }
    }

    fn db(drives: Vec<DriveModel>) -> DriveDb {
        DriveDb::new(RuleSet::new(drives), &ConfigManager::get_default()).unwrap()
    }

    #[test]
    fn test_default_only() {
        // 测试场景：仅有 DEFAULT 时任何输入都返回 DEFAULT 原样
        let db = db(default_rule_set().drives);
        let expected = default_rule_set().drives[0].presets.clone();

        for ident in [&b"WDC WD40EFRX-68N32N0"[..], b"", b"\xff\xfe\x00"] {
            let resolved = db.lookup_drive(ident);
            assert_eq!(resolved.presets, expected);
            assert!(resolved.family.is_empty());
            assert!(resolved.model_regex.is_empty());
            assert!(resolved.firmware_regex.is_empty());
            assert!(resolved.warning.is_empty());
            assert!(!resolved.is_matched());
        }
    }

    #[test]
    fn test_first_match_wins() {
        let db = db(vec![
            default_entry(&[("9", "raw24(raw8)", "Power_On_Hours")]),
            model_entry("First", "^ST[0-9]+", &[("9", "msec24hour32", "")]),
            model_entry("Second", "ST4000", &[("9", "raw48", "Second_Hours")]),
        ]);

        let resolved = db.lookup_drive(b"ST4000DM004-2CV104");
        assert_eq!(resolved.family, "First");
        assert_eq!(resolved.model_regex, "^ST[0-9]+");
        assert_eq!(resolved.firmware_regex, "First-fw");
        assert_eq!(resolved.warning, "First-warning");
        assert_eq!(resolved.matcher.as_ref().unwrap().as_str(), "^ST[0-9]+");
        assert_eq!(resolved.presets["9"], AttrConv::new("msec24hour32", "Power_On_Hours"));
    }

    #[test]
    fn test_override_inherits_name() {
        let db = db(vec![
            default_entry(&[("190", "tempminmax", "Airflow_Temperature_Cel")]),
            model_entry("Vendor", "VENDOR", &[("190", "raw48", "")]),
        ]);

        let resolved = db.lookup_drive(b"VENDOR X1");
        assert_eq!(resolved.presets["190"], AttrConv::new("raw48", "Airflow_Temperature_Cel"));
    }

    #[test]
    fn test_override_replaces_entry() {
        let db = db(vec![
            default_entry(&[("9", "raw24(raw8)", "Power_On_Hours")]),
            model_entry("Vendor", "VENDOR", &[("9", "raw48", "Custom_Hours")]),
        ]);

        let resolved = db.lookup_drive(b"VENDOR X1");
        assert_eq!(resolved.presets["9"], AttrConv::new("raw48", "Custom_Hours"));
    }

    #[test]
    fn test_new_counter_without_baseline_keeps_empty_name() {
        let db = db(vec![
            default_entry(&[("9", "raw24(raw8)", "Power_On_Hours")]),
            model_entry("Vendor", "VENDOR", &[("170", "raw48", "")]),
        ]);

        let resolved = db.lookup_drive(b"VENDOR");
        assert_eq!(resolved.presets["170"], AttrConv::new("raw48", ""));
        assert_eq!(resolved.presets.len(), 2);
    }

    #[test]
    fn test_lookup_does_not_mutate_database() {
        // 测试场景：多次查询后 DEFAULT 条目内容保持不变
        let db = db(vec![
            default_entry(&[("9", "raw24(raw8)", "Power_On_Hours"), ("190", "tempminmax", "Airflow_Temperature_Cel")]),
            model_entry("Vendor A", "^A", &[("9", "raw48", "A_Hours"), ("170", "raw48", "")]),
            model_entry("Vendor B", "^B", &[("190", "raw48", "")]),
        ]);
        let before = db.entries()[0].model.clone();

        let a = db.lookup_drive(b"A-1");
        let b = db.lookup_drive(b"B-1");
        let none = db.lookup_drive(b"C-1");

        assert_eq!(db.entries()[0].model, before);
        assert_eq!(b.presets["9"], AttrConv::new("raw24(raw8)", "Power_On_Hours"));
        assert!(!b.presets.contains_key("170"));
        assert_eq!(a.presets["190"], AttrConv::new("tempminmax", "Airflow_Temperature_Cel"));
        assert_eq!(none.presets, before.presets);
    }

    #[test]
    fn test_no_match_falls_back_to_default() {
        let db = db(vec![
            default_entry(&[("9", "raw24(raw8)", "Power_On_Hours")]),
            model_entry("Vendor", "^VENDOR", &[("9", "raw48", "Custom_Hours")]),
        ]);

        let resolved = db.lookup_drive(b"OTHER VENDOR");
        assert!(resolved.family.is_empty());
        assert_eq!(resolved.presets, presets(&[("9", "raw24(raw8)", "Power_On_Hours")]));
    }

    #[test]
    fn test_placeholder_is_skipped() {
        // 测试场景：占位条目即使正则可匹配也不会被选中，也不影响基线
        let db = db(vec![
            DriveModel {
                family: "$Id: drivedb.yaml 5000 $".to_string(),
                model_regex: ".*".to_string(),
                presets: presets(&[("9", "placeholder", "Placeholder")]),
                ..Default::default()
            },
            default_entry(&[("9", "raw24(raw8)", "Power_On_Hours")]),
        ]);

        let resolved = db.lookup_drive(b"ANY MODEL");
        assert!(!resolved.is_matched());
        assert_eq!(resolved.presets["9"], AttrConv::new("raw24(raw8)", "Power_On_Hours"));
        assert_eq!(db.families().collect::<Vec<_>>(), vec!["DEFAULT"]);
    }

    #[test]
    fn test_without_default_only_override_counters() {
        let db = db(vec![model_entry("Vendor", "VENDOR", &[("9", "raw48", "")])]);

        let resolved = db.lookup_drive(b"VENDOR");
        assert_eq!(resolved.presets, presets(&[("9", "raw48", "")]));
        assert!(db.lookup_drive(b"nothing").presets.is_empty());
    }

    #[test]
    fn test_default_after_match_is_not_consulted() {
        // 测试场景：命中后立即停止扫描，排在后面的 DEFAULT 不参与合并
        let db = db(vec![
            model_entry("Vendor", "VENDOR", &[("9", "raw48", "")]),
            default_entry(&[("9", "raw24(raw8)", "Power_On_Hours"), ("12", "raw48", "Power_Cycle_Count")]),
        ]);

        let resolved = db.lookup_drive(b"VENDOR");
        assert_eq!(resolved.presets, presets(&[("9", "raw48", "")]));
    }

    #[test]
    fn test_non_utf8_identity_matches_bytes() {
        let db = db(vec![model_entry("Binary", "^ABC", &[]), model_entry("Any", "^WD.$", &[])]);
        assert!(db.lookup_drive(b"ABC\xff\xfe").is_matched());
        assert!(!db.lookup_drive(b"\xffABC").is_matched());
        // 单个非法字节按一个字符匹配
        assert_eq!(db.lookup_drive(b"WD\xff").family, "Any");
        assert!(!db.lookup_drive(b"WD\xff\xff").is_matched());
    }

    #[test]
    fn test_invalid_pattern_entry_never_matches() {
        let db = db(vec![
            default_entry(&[("9", "raw24(raw8)", "Power_On_Hours")]),
            model_entry("Broken", "(", &[("9", "raw48", "Broken")]),
            model_entry("Fallback", ".", &[("9", "raw48", "Fallback")]),
        ]);

        assert_eq!(db.report().skipped.len(), 1);
        assert_eq!(db.lookup_drive(b"(").family, "Fallback");
    }

    #[test]
    fn test_open_missing_source_yields_empty_result() {
        // 测试场景：规则文件不存在且不使用内置规则时，查询结果完全为空
        let dir = TempDir::new().unwrap();
        let config = ConfigManager::custom()
            .rule_paths(vec![dir.path().join("missing.yaml")])
            .additional_rule_paths(Vec::new())
            .use_builtin_default(false)
            .build();

        let db = DriveDb::open(&config).unwrap();
        assert!(db.is_empty());

        let resolved = db.lookup_drive(b"WDC WD40EFRX");
        assert!(resolved.family.is_empty());
        assert!(resolved.presets.is_empty());
        assert!(resolved.matcher.is_none());
    }

    #[test]
    fn test_concurrent_lookups_share_database() {
        let db = Arc::new(db(vec![
            default_entry(&[("190", "tempminmax", "Airflow_Temperature_Cel")]),
            model_entry("Vendor", "^VENDOR", &[("190", "raw48", "")]),
        ]));

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let db = Arc::clone(&db);
                std::thread::spawn(move || {
                    let ident: &[u8] = if i % 2 == 0 { b"VENDOR" } else { b"OTHER" };
                    (0..100).map(|_| db.lookup_drive(ident).presets["190"].conv.clone()).collect::<Vec<_>>()
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let expected = if i % 2 == 0 { "raw48" } else { "tempminmax" };
            assert!(handle.join().unwrap().iter().all(|conv| conv == expected));
        }
    }

    #[tokio::test]
    async fn test_open_async_with_files() {
        let dir = TempDir::new().unwrap();
        let main = dir.path().join("drivedb.yaml");
        std::fs::write(
            &main,
            "drives:\n  - family: Samsung based SSDs\n    model_regex: 'SAMSUNG MZ7'\n    presets:\n      \"190\": { conv: raw48 }\n",
        )
        .unwrap();

        let config = ConfigManager::custom()
            .rule_paths(vec![main])
            .additional_rule_paths(Vec::new())
            .build();

        let db = DriveDb::open_async(&config).await.unwrap();
        let resolved = db.lookup_drive(b"SAMSUNG MZ7LH960HAJR-00005");
        assert_eq!(resolved.family, "Samsung based SSDs");
        assert_eq!(resolved.presets["190"], AttrConv::new("raw48", "Airflow_Temperature_Cel"));
        assert_eq!(resolved.presets["9"], AttrConv::new("raw24(raw8)", "Power_On_Hours"));
    }
}
