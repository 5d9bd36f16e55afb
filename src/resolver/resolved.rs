//! 查询结果模型
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use serde::Serialize;

use crate::compiler::CompiledPattern;
use crate::rule::AttrConv;
use crate::utils::vendor_attribute::VendorAttribute;

/// 型号查询结果：DEFAULT 基线与命中条目合并后的规则
///
/// `presets` 为每次查询新分配的映射，与规则库中的数据互不影响。
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResolvedModel {
    pub family: String,
    pub model_regex: String,
    pub firmware_regex: String,
    pub warning: String,
    pub presets: HashMap<String, AttrConv>,
    #[serde(skip)]
    pub matcher: Option<CompiledPattern>,
}

impl ResolvedModel {
    /// 是否命中了某个型号条目
    pub fn is_matched(&self) -> bool {
        self.matcher.is_some()
    }

    pub fn warning(&self) -> Option<&str> {
        (!self.warning.is_empty()).then_some(self.warning.as_str())
    }

    /// 按数字编号查询属性规则
    pub fn attribute(&self, id: u8) -> Option<&AttrConv> {
        self.presets.get(&id.to_string())
    }

    /// 按编号数值排序的属性列表，非数字编号排在最后
    pub fn sorted_presets(&self) -> Vec<(&str, &AttrConv)> {
        let mut presets: Vec<_> = self.presets.iter().map(|(id, conv)| (id.as_str(), conv)).collect();
        presets.sort_by(|(a, _), (b, _)| match (a.parse::<u32>(), b.parse::<u32>()) {
            (Ok(x), Ok(y)) => x.cmp(&y),
            (Ok(_), Err(_)) => std::cmp::Ordering::Less,
            (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
            (Err(_), Err(_)) => a.cmp(b),
        });
        presets
    }

    /// 叠加用户提供的属性描述（类似 smartctl -v），按给定顺序生效
    pub fn apply_vendor_attributes(&mut self, attributes: &[VendorAttribute]) {
        for attr in attributes {
            match attr.id {
                Some(id) => {
                    let incoming = AttrConv::new(attr.conv(), attr.name.clone().unwrap_or_default());
                    merge_preset(&mut self.presets, id.to_string(), incoming);
                }
                None => {
                    // N：作用于所有已有属性
                    for conv in self.presets.values_mut() {
                        conv.conv = attr.conv();
                        if let Some(name) = &attr.name {
                            conv.name = name.clone();
                        }
                    }
                }
            }
        }
    }
}

impl fmt::Display for ResolvedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.family.is_empty() {
            write!(f, "<unknown> ({} attributes)", self.presets.len())
        } else {
            write!(f, "{} ({} attributes)", self.family, self.presets.len())
        }
    }
}

/// 写入一条属性规则；名称为空且已有同编号规则时沿用已有名称
pub(crate) fn merge_preset(presets: &mut HashMap<String, AttrConv>, id: String, mut incoming: AttrConv) {
    match presets.entry(id) {
        Entry::Occupied(mut entry) => {
            if incoming.name.is_empty() {
                incoming.name = entry.get().name.clone();
            }
            entry.insert(incoming);
        }
        Entry::Vacant(entry) => {
            entry.insert(incoming);
        }
    }
}
