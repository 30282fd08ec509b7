//! JSON Schema 构建工具库
//!
//! 提供嵌套字段树的按路径不可变更新、扁平字段行展开和实时 JSON 预览投影
//! 遵循MVVM架构模式：model 为纯状态，vm 为 UI 无关的桥接常量，UI 绑定在 main.rs

pub mod model;
pub mod utils;
pub mod vm;

// 重新导出主要类型
pub use model::app_state::{AppError, AppState};
pub use model::field::{Field, FieldAttr, FieldId, FieldKind};
pub use model::field_path::FieldPath;
pub use model::field_rows::{flatten_fields, FieldRow};
pub use model::preview::{preview_text, project};
pub use model::schema_store::{FieldOp, SchemaError, SchemaStore, Snapshot};
