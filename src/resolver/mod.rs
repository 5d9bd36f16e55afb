//! 查询模块：型号匹配与规则合并
pub mod resolved;
pub mod resolver;
pub mod shared;

// 导出核心接口
pub use self::resolved::ResolvedModel;
pub use self::resolver::{resolve, DriveDb};
pub use self::shared::SharedDriveDb;
