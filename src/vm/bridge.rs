//! VM桥接层：连接Slint UI与AppState数据模型
//!
//! 注意：回调绑定在main.rs中，因为依赖于Slint生成的类型
//! 这里只提供与UI类型无关的常量和文案

use crate::model::field::FieldKind;
use crate::model::schema_store::FieldOp;

// === 常量定义（消除魔法值） ===
pub const STATUS_READY: &str = "就绪";
pub const STATUS_COPIED: &str = "预览已复制到剪贴板";
pub const STATUS_EXPORTED: &str = "预览已导出";
pub const STATUS_EXPORT_CANCELLED: &str = "已取消导出";
pub const STATUS_ERROR_PREFIX: &str = "错误: ";

/// 导出对话框默认文件名
pub const DEFAULT_EXPORT_FILE_NAME: &str = "schema_preview.json";

/// 类型下拉框选项（与 FieldKind::selector_value 一致）
pub fn kind_options() -> Vec<&'static str> {
    FieldKind::ALL.iter().map(|kind| kind.selector_value()).collect()
}

/// 变更成功后的状态栏文案
pub fn status_for_op(op: &FieldOp) -> String {
    match op {
        FieldOp::AddField(path) if path.is_root() => "已添加顶层字段".to_string(),
        FieldOp::AddField(path) => format!("已添加嵌套字段: [{}]", path),
        FieldOp::RemoveField(path) => format!("已删除字段: [{}]", path),
        FieldOp::UpdateField(path, key, value) if key == "kind" => {
            format!("字段 [{}] 类型改为 {}", path, value)
        }
        FieldOp::UpdateField(path, _, _) => format!("字段 [{}] 已重命名", path),
    }
}

/// 失败时的状态栏文案
pub fn error_status(err: &impl std::fmt::Display) -> String {
    format!("{}{}", STATUS_ERROR_PREFIX, err)
}
