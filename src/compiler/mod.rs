//! 编译模块：将规则集中的型号正则编译为可执行的匹配模式
pub mod pattern;
pub mod compiler;

pub use self::pattern::{CompiledPattern, CompiledDriveModel, CompileReport, EntryKind, SkippedEntry};
pub use self::compiler::RuleCompiler;
