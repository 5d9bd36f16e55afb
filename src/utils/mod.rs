//! 工具模块：用户属性描述解析等通用能力
pub mod vendor_attribute;

pub use self::vendor_attribute::{DriveType, VendorAttribute};
