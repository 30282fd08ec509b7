//! 字段模型：字段节点、类型标签与可更新属性
//!
//! 不变量：`children` 存在当且仅当 `kind == Nested`，由 `set_kind` 统一维护

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::model::schema_store::SchemaError;

/// 字段类型（封闭集合）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FieldKind {
    String,
    Number,
    Nested,
}

impl FieldKind {
    pub const ALL: [FieldKind; 3] = [FieldKind::String, FieldKind::Number, FieldKind::Nested];

    /// 预览中展示的标签
    pub fn label(self) -> &'static str {
        match self {
            FieldKind::String => "String",
            FieldKind::Number => "Number",
            FieldKind::Nested => "Nested",
        }
    }

    /// UI 下拉框中的取值
    pub fn selector_value(self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Number => "number",
            FieldKind::Nested => "nested",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FieldKind {
    type Err = SchemaError;

    /// 不区分大小写："number" / "Number" 均可
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        FieldKind::ALL
            .into_iter()
            .find(|kind| kind.selector_value().eq_ignore_ascii_case(s))
            .ok_or_else(|| SchemaError::InvalidKind(s.to_string()))
    }
}

/// 可更新的字段属性
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldAttr {
    Name,
    Kind,
}

impl FromStr for FieldAttr {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(FieldAttr::Name),
            "kind" => Ok(FieldAttr::Kind),
            other => Err(SchemaError::InvalidAttribute(other.to_string())),
        }
    }
}

/// 字段标识：仅用于 UI 稳定身份，进程内单调递增
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FieldId(String);

impl FieldId {
    pub fn next() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        let n = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        Self(format!("f{:06x}", n))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 字段树中的一个节点
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    id: FieldId,
    name: String,
    kind: FieldKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    children: Option<Vec<Field>>,
}

impl Field {
    /// 新建空字段：空名称、String 类型、无子字段
    pub fn empty() -> Self {
        Self::new("", FieldKind::String)
    }

    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        let mut field = Self {
            id: FieldId::next(),
            name: name.into(),
            kind: FieldKind::String,
            children: None,
        };
        field.set_kind(kind);
        field
    }

    /// 构造带子字段的 Nested 字段
    pub fn nested(name: impl Into<String>, children: Vec<Field>) -> Self {
        Self {
            id: FieldId::next(),
            name: name.into(),
            kind: FieldKind::Nested,
            children: Some(children),
        }
    }

    pub fn id(&self) -> &FieldId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn is_nested(&self) -> bool {
        self.kind == FieldKind::Nested
    }

    /// 子字段序列；非 Nested 字段返回 None
    pub fn children(&self) -> Option<&[Field]> {
        self.children.as_deref()
    }

    pub fn child_count(&self) -> usize {
        self.children.as_ref().map_or(0, Vec::len)
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<Field>> {
        self.children.as_mut()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// 切换类型：转为 Nested 时补齐空子序列，转为其他类型时立即丢弃子树
    pub fn set_kind(&mut self, kind: FieldKind) {
        self.kind = kind;
        match kind {
            FieldKind::Nested => {
                self.children.get_or_insert_with(Vec::new);
            }
            FieldKind::String | FieldKind::Number => self.children = None,
        }
    }

    /// 忽略 id 的结构比较
    pub fn same_shape(&self, other: &Field) -> bool {
        self.name == other.name
            && self.kind == other.kind
            && match (self.children(), other.children()) {
                (None, None) => true,
                (Some(a), Some(b)) => same_shape(a, b),
                _ => false,
            }
    }
}

/// 忽略 id 比较两个字段序列的结构
pub fn same_shape(a: &[Field], b: &[Field]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_shape(y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_field_defaults() {
        let field = Field::empty();
        assert_eq!(field.name(), "");
        assert_eq!(field.kind(), FieldKind::String);
        assert!(field.children().is_none(), "String 字段不应有子序列");
    }

    #[test]
    fn test_field_ids_are_distinct() {
        let a = Field::empty();
        let b = Field::empty();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_kind_parsing_is_case_insensitive() {
        assert_eq!("number".parse::<FieldKind>().unwrap(), FieldKind::Number);
        assert_eq!("Nested".parse::<FieldKind>().unwrap(), FieldKind::Nested);
        assert_eq!(" STRING ".parse::<FieldKind>().unwrap(), FieldKind::String);
        assert_eq!(
            "bool".parse::<FieldKind>(),
            Err(SchemaError::InvalidKind("bool".into()))
        );
    }

    #[test]
    fn test_attr_parsing() {
        assert_eq!("name".parse::<FieldAttr>().unwrap(), FieldAttr::Name);
        assert_eq!("kind".parse::<FieldAttr>().unwrap(), FieldAttr::Kind);
        assert_eq!(
            "id".parse::<FieldAttr>(),
            Err(SchemaError::InvalidAttribute("id".into()))
        );
    }

    #[test]
    fn test_set_kind_maintains_children_invariant() {
        let mut field = Field::nested("addr", vec![Field::new("city", FieldKind::String)]);
        assert_eq!(field.child_count(), 1);

        // 已有子序列时再次设为 Nested 不应清空
        field.set_kind(FieldKind::Nested);
        assert_eq!(field.child_count(), 1);

        field.set_kind(FieldKind::Number);
        assert!(field.children().is_none(), "离开 Nested 应丢弃子树");

        field.set_kind(FieldKind::Nested);
        assert_eq!(field.children(), Some(&[][..]), "重新设为 Nested 应得到空子序列");
    }

    #[test]
    fn test_serialized_form() {
        let field = Field::nested("addr", vec![Field::new("zip", FieldKind::Number)]);
        let value = serde_json::to_value(&field).unwrap();

        assert_eq!(value["name"], "addr");
        assert_eq!(value["kind"], "Nested");
        assert_eq!(value["id"], field.id().as_str());
        assert_eq!(value["children"][0]["kind"], "Number");
        assert!(value["children"][0].get("children").is_none(), "非 Nested 字段不输出 children");
    }

    #[test]
    fn test_same_shape_ignores_ids() {
        let a = vec![Field::nested("a", vec![Field::new("b", FieldKind::Number)])];
        let b = vec![Field::nested("a", vec![Field::new("b", FieldKind::Number)])];
        assert_ne!(a, b, "id 不同，直接比较应不相等");
        assert!(same_shape(&a, &b));

        let c = vec![Field::nested("a", vec![Field::new("b", FieldKind::String)])];
        assert!(!same_shape(&a, &c));
    }
}
