//! 预览投影：把字段森林映射为 `{字段名: "String" | "Number" | {...}}` 形式的 JSON 对象
//!
//! 纯函数，无副作用；键顺序与字段插入顺序一致（serde_json 开启 preserve_order）

use serde_json::{Map, Value};

use crate::model::field::{Field, FieldKind};

/// 投影整个森林
pub fn project(fields: &[Field]) -> Value {
    Value::Object(project_map(fields))
}

fn project_map(fields: &[Field]) -> Map<String, Value> {
    let mut map = Map::new();
    for field in fields {
        // 空名称字段（及其子树）不参与预览
        if field.name().is_empty() {
            continue;
        }
        let value = match field.kind() {
            FieldKind::String | FieldKind::Number => Value::String(field.kind().label().to_string()),
            FieldKind::Nested => Value::Object(project_map(field.children().unwrap_or_default())),
        };
        // 同级重名：保留首次出现的位置，值以最后一次为准
        map.insert(field.name().to_string(), value);
    }
    map
}

/// 预览的可读文本（两空格缩进）
pub fn preview_text(preview: &Value) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(preview)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_forest() {
        assert_eq!(project(&[]), json!({}));
        assert_eq!(preview_text(&project(&[])).unwrap(), "{}");
    }

    #[test]
    fn test_leaf_labels() {
        let fields = vec![
            Field::new("title", FieldKind::String),
            Field::new("age", FieldKind::Number),
        ];
        assert_eq!(project(&fields), json!({"title": "String", "age": "Number"}));
    }

    #[test]
    fn test_nested_projection() {
        let fields = vec![Field::nested(
            "user",
            vec![
                Field::new("name", FieldKind::String),
                Field::nested("address", vec![Field::new("zip", FieldKind::Number)]),
                Field::nested("tags", vec![]),
            ],
        )];
        assert_eq!(
            project(&fields),
            json!({
                "user": {
                    "name": "String",
                    "address": {"zip": "Number"},
                    "tags": {}
                }
            })
        );
    }

    #[test]
    fn test_empty_names_are_omitted_with_subtree() {
        let fields = vec![
            Field::new("", FieldKind::Number),
            Field::nested("", vec![Field::new("hidden", FieldKind::String)]),
            Field::nested("shown", vec![Field::new("", FieldKind::String)]),
        ];
        let preview = project(&fields);
        assert_eq!(preview, json!({"shown": {}}));
        assert!(!preview_text(&preview).unwrap().contains("hidden"));
    }

    #[test]
    fn test_duplicate_sibling_names_last_write_wins() {
        let fields = vec![
            Field::new("id", FieldKind::String),
            Field::new("other", FieldKind::String),
            Field::new("id", FieldKind::Number),
        ];
        let preview = project(&fields);
        assert_eq!(preview, json!({"id": "Number", "other": "String"}));

        let keys: Vec<&str> = preview.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["id", "other"]);
    }

    #[test]
    fn test_key_order_follows_insertion() {
        let fields = vec![
            Field::new("zeta", FieldKind::String),
            Field::new("alpha", FieldKind::String),
            Field::new("mid", FieldKind::Number),
        ];
        let preview = project(&fields);
        let keys: Vec<&str> = preview.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_projection_is_idempotent() {
        let fields = vec![
            Field::nested("a", vec![Field::new("b", FieldKind::Number)]),
            Field::new("c", FieldKind::String),
        ];
        assert_eq!(project(&fields), project(&fields));
    }

    #[test]
    fn test_preview_text_indentation() {
        let fields = vec![Field::nested("addr", vec![Field::new("city", FieldKind::String)])];
        let text = preview_text(&project(&fields)).unwrap();
        assert_eq!(text, "{\n  \"addr\": {\n    \"city\": \"String\"\n  }\n}");
    }
}
