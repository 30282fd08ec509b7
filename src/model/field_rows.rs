//! 字段行：把字段森林按深度优先展开为扁平行列表，供 UI 列表逐行渲染

use crate::model::field::{Field, FieldId, FieldKind};
use crate::model::field_path::FieldPath;

#[derive(Debug, Clone, PartialEq)]
pub struct FieldRow {
    pub id: FieldId,
    pub name: String,
    pub kind: FieldKind,
    /// 索引路径（用于回传变更请求）
    pub path: FieldPath,
    /// 字段在预览中的 JSONPath；空名称字段及其子孙不可达，为空串
    pub json_path: String,
    /// 节点深度（用于UI缩进显示）
    pub depth: u32,
    /// 直接子字段数量
    pub child_count: u32,
}

impl FieldRow {
    pub fn is_nested(&self) -> bool {
        self.kind == FieldKind::Nested
    }

    /// 是否出现在预览中
    pub fn in_preview(&self) -> bool {
        !self.json_path.is_empty()
    }
}

/// 展开整个森林
pub fn flatten_fields(fields: &[Field]) -> Vec<FieldRow> {
    fn walk(out: &mut Vec<FieldRow>, fields: &[Field], parent: &FieldPath, parent_json: &str, depth: u32) {
        for (index, field) in fields.iter().enumerate() {
            let path = parent.child(index);
            let json_path = if parent_json.is_empty() || field.name().is_empty() {
                String::new()
            } else {
                json_path_segment(parent_json, field.name())
            };
            out.push(FieldRow {
                id: field.id().clone(),
                name: field.name().to_string(),
                kind: field.kind(),
                path: path.clone(),
                json_path: json_path.clone(),
                depth,
                child_count: field.child_count() as u32,
            });
            if let Some(children) = field.children() {
                walk(out, children, &path, &json_path, depth + 1);
            }
        }
    }

    let mut out = Vec::new();
    walk(&mut out, fields, &FieldPath::root(), "$", 0);
    out
}

/// JSONPath 字段含特殊字符时使用 bracket-notation
fn json_path_segment(parent: &str, key: &str) -> String {
    if key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        format!("{}.{}", parent, key)
    } else {
        format!("{}['{}']", parent, escape_quoted_key(key))
    }
}

/// 单引号字面量转义：引号、反斜杠与 U+0000..U+001F 控制字符
fn escape_quoted_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for c in key.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c < '\u{20}' => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_order_and_depth() {
        let fields = vec![
            Field::nested(
                "addr",
                vec![
                    Field::new("city", FieldKind::String),
                    Field::nested("geo", vec![Field::new("lat", FieldKind::Number)]),
                ],
            ),
            Field::new("age", FieldKind::Number),
        ];

        let rows = flatten_fields(&fields);

        // 深度优先：addr, city, geo, lat, age
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["addr", "city", "geo", "lat", "age"]);

        let depths: Vec<u32> = rows.iter().map(|r| r.depth).collect();
        assert_eq!(depths, vec![0, 1, 1, 2, 0]);

        let paths: Vec<String> = rows.iter().map(|r| r.path.to_string()).collect();
        assert_eq!(paths, vec!["0", "0.0", "0.1", "0.1.0", "1"]);

        assert_eq!(rows[0].child_count, 2);
        assert!(rows[0].is_nested());
        assert_eq!(rows[4].child_count, 0);
    }

    #[test]
    fn test_json_paths() {
        let fields = vec![
            Field::nested(
                "user",
                vec![
                    Field::new("first_name", FieldKind::String),
                    Field::new("home town", FieldKind::String),
                    Field::new("it's", FieldKind::String),
                ],
            ),
        ];

        let rows = flatten_fields(&fields);
        let json_paths: Vec<&str> = rows.iter().map(|r| r.json_path.as_str()).collect();
        assert_eq!(
            json_paths,
            vec!["$.user", "$.user.first_name", "$.user['home town']", "$.user['it\\'s']"]
        );
    }

    #[test]
    fn test_json_paths_escape_control_chars() {
        let fields = vec![
            Field::new("tab\there", FieldKind::String),
            Field::new("line\nbreak", FieldKind::String),
            Field::new("bell\u{07}", FieldKind::String),
            Field::new("a\\b", FieldKind::String),
        ];

        let rows = flatten_fields(&fields);
        let json_paths: Vec<&str> = rows.iter().map(|r| r.json_path.as_str()).collect();
        assert_eq!(
            json_paths,
            vec![r"$['tab\there']", r"$['line\nbreak']", r"$['bell\u0007']", r"$['a\\b']"]
        );
        assert!(
            json_paths.iter().all(|p| !p.chars().any(char::is_control)),
            "JSONPath 中不应出现原始控制字符"
        );
    }

    #[test]
    fn test_unnamed_fields_are_unreachable() {
        let fields = vec![
            Field::nested("", vec![Field::new("child", FieldKind::String)]),
            Field::new("named", FieldKind::String),
        ];

        let rows = flatten_fields(&fields);
        assert_eq!(rows.len(), 3, "空名称字段本身仍然生成行");
        assert!(!rows[0].in_preview());
        assert!(!rows[1].in_preview(), "空名称字段的子孙不在预览中");
        assert_eq!(rows[2].json_path, "$.named");
    }

    #[test]
    fn test_row_ids_follow_fields() {
        let fields = vec![Field::new("a", FieldKind::String)];
        let rows = flatten_fields(&fields);
        assert_eq!(&rows[0].id, fields[0].id());
    }
}
