//! 规则数据模型定义
//! 仅存储规则数据，无任何业务逻辑，支持序列化/反序列化

use std::collections::HashMap;
use std::fmt;
use serde::{Deserialize, Deserializer, Serialize};

/// 基线条目的保留 family 名称
pub const DEFAULT_FAMILY: &str = "DEFAULT";

/// 占位/注释条目的 family 前缀（版本控制关键字替换产生）
pub const PLACEHOLDER_MARKER: &str = "$Id";

/// 单个 SMART 属性的解析规则
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttrConv {
    #[serde(default, deserialize_with = "null_as_default")]
    pub conv: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

impl AttrConv {
    pub fn new(conv: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            conv: conv.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for AttrConv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "{}", self.conv)
        } else {
            write!(f, "{} ({})", self.name, self.conv)
        }
    }
}

/// 规则文件中的一个型号条目
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveModel {
    #[serde(default, deserialize_with = "null_as_default")]
    pub family: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub model_regex: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub firmware_regex: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub warning: String,
    #[serde(default, deserialize_with = "deserialize_presets")]
    pub presets: HashMap<String, AttrConv>,
}

impl DriveModel {
    /// 是否为 DEFAULT 基线条目
    pub fn is_default(&self) -> bool {
        self.family == DEFAULT_FAMILY
    }

    /// 是否为占位/注释条目
    pub fn is_placeholder(&self) -> bool {
        self.family.starts_with(PLACEHOLDER_MARKER)
    }
}

/// 有序规则集，顺序即匹配优先级
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default, deserialize_with = "null_as_default")]
    pub drives: Vec<DriveModel>,
}

impl RuleSet {
    pub fn new(drives: Vec<DriveModel>) -> Self {
        Self { drives }
    }

    pub fn len(&self) -> usize {
        self.drives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drives.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DriveModel> {
        self.drives.iter()
    }

    /// 第一个 DEFAULT 条目
    pub fn default_entry(&self) -> Option<&DriveModel> {
        self.drives.iter().find(|d| d.is_default())
    }

    /// 合并内置默认规则集与按优先级排列的已加载规则集
    ///
    /// 已加载规则集中的第一个 DEFAULT 条目优先，否则使用内置 DEFAULT；
    /// 结果中只保留一个 DEFAULT 且放在最前，其余条目保持原有相对顺序。
    pub fn compose(builtin: Option<RuleSet>, loaded: impl IntoIterator<Item = RuleSet>) -> RuleSet {
        let mut baseline: Option<DriveModel> = None;
        let mut drives = Vec::new();

        for part in loaded {
            for drive in part.drives {
                if drive.is_default() {
                    if baseline.is_none() {
                        baseline = Some(drive);
                    }
                    continue;
                }
                drives.push(drive);
            }
        }

        if baseline.is_none() {
            baseline = builtin.and_then(|b| b.drives.into_iter().find(|d| d.is_default()));
        }

        if let Some(default) = baseline {
            drives.insert(0, default);
        }

        RuleSet { drives }
    }
}

impl From<Vec<DriveModel>> for RuleSet {
    fn from(drives: Vec<DriveModel>) -> Self {
        Self::new(drives)
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a DriveModel;
    type IntoIter = std::slice::Iter<'a, DriveModel>;

    fn into_iter(self) -> Self::IntoIter {
        self.drives.iter()
    }
}

/// 规则文件顶层结构：`drives:` 包裹或直接为序列
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RuleDocument {
    Wrapped(RuleSet),
    Bare(Vec<DriveModel>),
}

impl From<RuleDocument> for RuleSet {
    fn from(doc: RuleDocument) -> Self {
        match doc {
            RuleDocument::Wrapped(set) => set,
            RuleDocument::Bare(drives) => RuleSet::new(drives),
        }
    }
}

// YAML 中空值（`warning:`）按默认值处理
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// 属性编号在 YAML 中可能写成数字或字符串
#[derive(Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(untagged)]
enum CounterKey {
    Number(u64),
    Text(String),
}

fn deserialize_presets<'de, D>(deserializer: D) -> Result<HashMap<String, AttrConv>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<HashMap<CounterKey, AttrConv>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(key, conv)| {
            let id = match key {
                CounterKey::Number(n) => n.to_string(),
                CounterKey::Text(s) => s,
            };
            (id, conv)
        })
        .collect())
}
