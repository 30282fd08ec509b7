//! SchemaStore：字段树的权威状态与按路径寻址的变更
//!
//! 每次成功变更都会生成一个全新的快照（与旧快照无共享可变状态），
//! 并同步重算预览；失败时快照与预览均保持不变。

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::model::field::{Field, FieldAttr, FieldKind};
use crate::model::field_path::FieldPath;
use crate::model::preview::project;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("路径不存在: [{path}]（第 {depth} 级索引无效）")]
    PathNotFound { path: String, depth: usize },
    #[error("路径不能为空")]
    InvalidPath,
    #[error("不支持的字段属性: {0}")]
    InvalidAttribute(String),
    #[error("不支持的字段类型: {0}")]
    InvalidKind(String),
    #[error("路径格式错误: {0}")]
    MalformedPath(String),
}

impl SchemaError {
    /// 是否为路径类错误（调用方可据此重新计算路径后重试）
    pub fn is_path_error(&self) -> bool {
        matches!(
            self,
            SchemaError::PathNotFound { .. } | SchemaError::InvalidPath | SchemaError::MalformedPath(_)
        )
    }
}

/// 变更请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldOp {
    /// 在路径所指的子序列末尾追加空字段（空路径即根森林）
    AddField(FieldPath),
    /// 删除路径所指字段及其整棵子树
    RemoveField(FieldPath),
    /// 设置路径所指字段的属性：(路径, 属性名, 值)
    UpdateField(FieldPath, String, String),
}

impl FieldOp {
    pub fn path(&self) -> &FieldPath {
        match self {
            FieldOp::AddField(path) | FieldOp::RemoveField(path) | FieldOp::UpdateField(path, _, _) => path,
        }
    }
}

impl fmt::Display for FieldOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldOp::AddField(path) => write!(f, "AddField([{}])", path),
            FieldOp::RemoveField(path) => write!(f, "RemoveField([{}])", path),
            FieldOp::UpdateField(path, key, value) => {
                write!(f, "UpdateField([{}], {:?}, {:?})", path, key, value)
            }
        }
    }
}

/// 森林的一个不可变版本
#[derive(Debug, Clone)]
pub struct Snapshot {
    fields: Arc<Vec<Field>>,
    revision: u64,
}

impl Snapshot {
    fn empty() -> Self {
        Self {
            fields: Arc::new(Vec::new()),
            revision: 0,
        }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// 修订号：初始空森林为 0，每次成功变更加 1
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// 引用同一性比较
    pub fn same_as(&self, other: &Snapshot) -> bool {
        Arc::ptr_eq(&self.fields, &other.fields)
    }

    pub fn field_at(&self, path: &FieldPath) -> Result<&Field, SchemaError> {
        path.resolve_field(&self.fields)
    }

    pub fn children_at(&self, path: &FieldPath) -> Result<&[Field], SchemaError> {
        path.resolve_children(&self.fields)
    }

    /// 紧凑 JSON 形式的完整字段树（含 id 与类型），用于调试日志
    pub fn dump(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self.fields())
    }

    /// 森林中字段总数（含所有层级）
    pub fn total_fields(&self) -> usize {
        fn count(fields: &[Field]) -> usize {
            fields
                .iter()
                .map(|f| 1 + f.children().map_or(0, count))
                .sum()
        }
        count(&self.fields)
    }
}

#[derive(Debug)]
pub struct SchemaStore {
    snapshot: Snapshot,
    preview: Value,
}

impl Default for SchemaStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaStore {
    pub fn new() -> Self {
        let snapshot = Snapshot::empty();
        let preview = project(snapshot.fields());
        Self { snapshot, preview }
    }

    /// 最新提交的快照
    pub fn current_snapshot(&self) -> Snapshot {
        self.snapshot.clone()
    }

    /// 最新快照对应的预览
    pub fn current_preview(&self) -> &Value {
        &self.preview
    }

    /// 应用一次变更：成功时提交新快照并重算预览，失败时状态不变
    pub fn dispatch(&mut self, op: FieldOp) -> Result<Snapshot, SchemaError> {
        tracing::debug!("dispatch: {}", op);

        // 在副本上执行，失败即丢弃副本
        let mut next = self.snapshot.fields().to_vec();
        if let Err(e) = apply(&mut next, &op) {
            tracing::warn!("变更被拒绝: {}，原因: {}", op, e);
            return Err(e);
        }

        let snapshot = Snapshot {
            fields: Arc::new(next),
            revision: self.snapshot.revision + 1,
        };
        self.preview = project(snapshot.fields());
        self.snapshot = snapshot.clone();

        tracing::info!(
            "快照已提交: rev={}，顶层字段 {} 个，总字段 {} 个",
            snapshot.revision(),
            snapshot.len(),
            snapshot.total_fields()
        );
        if tracing::enabled!(tracing::Level::DEBUG) {
            match snapshot.dump() {
                Ok(dump) => tracing::debug!("快照内容: {}", dump),
                Err(e) => tracing::warn!("快照序列化失败: {}", e),
            }
        }
        Ok(snapshot)
    }

    pub fn add_field(&mut self, path: impl Into<FieldPath>) -> Result<Snapshot, SchemaError> {
        self.dispatch(FieldOp::AddField(path.into()))
    }

    pub fn remove_field(&mut self, path: impl Into<FieldPath>) -> Result<Snapshot, SchemaError> {
        self.dispatch(FieldOp::RemoveField(path.into()))
    }

    pub fn update_field(
        &mut self,
        path: impl Into<FieldPath>,
        key: &str,
        value: &str,
    ) -> Result<Snapshot, SchemaError> {
        self.dispatch(FieldOp::UpdateField(path.into(), key.to_string(), value.to_string()))
    }
}

fn apply(fields: &mut Vec<Field>, op: &FieldOp) -> Result<(), SchemaError> {
    match op {
        FieldOp::AddField(path) => {
            path.resolve_children_mut(fields)?.push(Field::empty());
        }
        FieldOp::RemoveField(path) => {
            let removed = path.remove_from(fields)?;
            tracing::debug!("已删除字段 {}（含 {} 个直接子字段）", removed.id(), removed.child_count());
        }
        FieldOp::UpdateField(path, key, value) => {
            if path.is_root() {
                return Err(SchemaError::InvalidPath);
            }
            let field = path.resolve_field_mut(fields)?;
            let attr: FieldAttr = key.parse()?;
            match attr {
                FieldAttr::Name => field.set_name(value.as_str()),
                FieldAttr::Kind => field.set_kind(value.parse::<FieldKind>()?),
            }
        }
    }
    Ok(())
}
