/// 配置文件解析模块
///
/// 两阶段流水线，永不报错：
/// 1. 尝试按 JSON 解析，嵌套对象展开为点号连接的键
/// 2. JSON 失败时回退到行格式 `name: value ; comment`
///
/// 不匹配的行被静默丢弃。
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use serde_json::{Map, Value};

use crate::value::{coerce, FieldValue};

/// 行格式：标识符、冒号、可选引号包裹的值、可选 `;`/`#` 注释
static LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^\s*([a-zA-Z_][a-zA-Z0-9_]*)\s*:\s*(?:"([^'";\n#]*)"|'([^'";\n#]*)'|([^'";\n#]*))\s*([;#].*)?$"#,
    )
    .expect("invalid line regex")
});

/// 注释行前缀
const COMMENT_PREFIXES: &[&str] = &["#", ";", "//", "--"];

/// 单个可编辑字段
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// 推断后的类型化值
    pub value: FieldValue,
    /// 推断前的原始值
    pub original_value: Value,
    /// 行格式中为源行号，JSON 中为遍历序号
    pub line_index: usize,
    /// 源片段（JSON 模式下为合成的 `"key": value`）
    pub original_line: String,
    /// 行尾注释（含 `;`/`#` 前缀），没有时为空
    pub comment: String,
}

/// 字段名 → 字段，按源顺序排列
pub type FieldMap = IndexMap<String, Field>;

/// 解析方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    Json,
    Lines,
}

/// 解析文件内容为字段表
pub fn parse_fields(content: &str) -> FieldMap {
    parse_fields_with_mode(content).0
}

/// 解析文件内容，同时返回实际采用的解析方式
pub fn parse_fields_with_mode(content: &str) -> (FieldMap, ParseMode) {
    match serde_json::from_str::<Value>(content) {
        Ok(json) => {
            let fields = parse_json(&json);
            tracing::debug!("按 JSON 解析得到 {} 个字段", fields.len());
            (fields, ParseMode::Json)
        }
        Err(e) => {
            tracing::debug!("JSON 解析失败，回退到行格式: {}", e);
            let fields = parse_lines(content);
            tracing::debug!("按行格式解析得到 {} 个字段", fields.len());
            (fields, ParseMode::Lines)
        }
    }
}

fn parse_json(json: &Value) -> FieldMap {
    let mut leaves = Vec::new();
    match json {
        Value::Object(map) => flatten_object(map, "", &mut leaves),
        Value::Array(items) => {
            // 根数组按下标作为键
            let map: Map<String, Value> = items
                .iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v.clone()))
                .collect();
            flatten_object(&map, "", &mut leaves);
        }
        // 标量根没有可编辑的字段
        _ => {}
    }

    leaves
        .into_iter()
        .enumerate()
        .map(|(index, (key, raw))| {
            let original_line = format!("\"{}\": {}", key, raw);
            let field = Field {
                value: coerce(&raw),
                original_value: raw,
                line_index: index,
                original_line,
                comment: String::new(),
            };
            (key, field)
        })
        .collect()
}

/// 递归展开嵌套对象，数组视为叶子
fn flatten_object(map: &Map<String, Value>, prefix: &str, out: &mut Vec<(String, Value)>) {
    for (key, value) in map {
        let full_key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };

        match value {
            Value::Object(nested) => flatten_object(nested, &full_key, out),
            leaf => out.push((full_key, leaf.clone())),
        }
    }
}

fn parse_lines(content: &str) -> FieldMap {
    let mut fields = FieldMap::new();

    for (index, line) in content.split('\n').enumerate() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if is_skippable(line) {
            continue;
        }

        let Some(caps) = LINE_RE.captures(line) else {
            tracing::trace!("第 {} 行不匹配，已跳过: {}", index, line);
            continue;
        };

        let name = caps[1].to_string();
        let raw_value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map(|m| m.as_str().trim())
            .unwrap_or_default();
        let comment = caps.get(5).map(|m| m.as_str()).unwrap_or_default();

        let original_value = Value::String(raw_value.to_string());
        let field = Field {
            value: coerce(&original_value),
            original_value,
            line_index: index,
            original_line: line.to_string(),
            comment: comment.to_string(),
        };
        // 重复的名称保留首次出现的位置，值以最后一次为准
        fields.insert(name, field);
    }

    fields
}

fn is_skippable(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || COMMENT_PREFIXES.iter().any(|p| trimmed.starts_with(p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_line_with_comment() {
        let fields = parse_fields("retries: 3 ; max attempts");
        let field = &fields["retries"];
        assert_eq!(field.value, FieldValue::Text("3".into()));
        assert_eq!(field.original_value, json!("3"));
        assert_eq!(field.comment, "; max attempts");
        assert_eq!(field.line_index, 0);
        assert_eq!(field.original_line, "retries: 3 ; max attempts");
    }

    #[test]
    fn test_json_boolean_coercion() {
        let fields = parse_fields(r#"{"enabled": 1}"#);
        let field = &fields["enabled"];
        assert_eq!(field.value, FieldValue::Bool(true));
        assert_eq!(field.original_value, json!(1));
        assert_eq!(field.original_line, r#""enabled": 1"#);
        assert_eq!(field.comment, "");
    }

    #[test]
    fn test_json_flatten_preserves_order() {
        let content = r#"{
            "name": "nightly",
            "source": {"host": "db1", "port": 5432, "tables": ["a", "b"]},
            "start": "2021-05-01T00:00:00",
            "active": "0"
        }"#;
        let (fields, mode) = parse_fields_with_mode(content);
        assert_eq!(mode, ParseMode::Json);

        let keys: Vec<&str> = fields.keys().map(|k| k.as_str()).collect();
        assert_eq!(
            keys,
            vec!["name", "source.host", "source.port", "source.tables", "start", "active"]
        );
        assert_eq!(fields["source.port"].value, FieldValue::Number(5432.into()));
        assert_eq!(fields["source.port"].line_index, 2);
        assert_eq!(fields["source.tables"].value, FieldValue::Other(json!(["a", "b"])));
        assert!(fields["start"].value.is_datetime());
        assert_eq!(fields["start"].original_value, json!("2021-05-01T00:00:00"));
        assert_eq!(fields["active"].value, FieldValue::Bool(false));
    }

    #[test]
    fn test_json_integer_like_keys_keep_source_order() {
        let fields = parse_fields(r#"{"b": 5, "10": 2, "2": 3}"#);
        let keys: Vec<&str> = fields.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["b", "10", "2"]);
    }

    #[test]
    fn test_json_empty_nested_object_has_no_leaves() {
        let fields = parse_fields(r#"{"a": {}, "b": null}"#);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields["b"].value, FieldValue::Other(Value::Null));
    }

    #[test]
    fn test_json_scalar_root_is_empty() {
        let (fields, mode) = parse_fields_with_mode("42");
        assert_eq!(mode, ParseMode::Json);
        assert!(fields.is_empty());
    }

    #[test]
    fn test_line_format_variants() {
        let content = "\
# header comment
; another comment
// slash comment
-- dash comment

host: \"db.example.com\"
user: 'admin' # who
flag: 1
start:2021-05-01T08:30:00
not a field line
bad-name: x
";
        let (fields, mode) = parse_fields_with_mode(content);
        assert_eq!(mode, ParseMode::Lines);

        let keys: Vec<&str> = fields.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["host", "user", "flag", "start"]);

        assert_eq!(fields["host"].value, FieldValue::Text("db.example.com".into()));
        assert_eq!(fields["host"].line_index, 5);
        assert_eq!(fields["user"].comment, "# who");
        assert_eq!(fields["flag"].value, FieldValue::Bool(true));
        assert_eq!(fields["flag"].original_value, json!("1"));
        assert!(fields["start"].value.is_datetime());
    }

    #[test]
    fn test_mismatched_quotes_are_dropped() {
        let fields = parse_fields("a: \"value'\nb: ok");
        assert!(!fields.contains_key("a"));
        assert_eq!(fields["b"].value, FieldValue::Text("ok".into()));
    }

    #[test]
    fn test_crlf_lines() {
        let fields = parse_fields("a: 1 ; note\r\nb: two\r\n");
        assert_eq!(fields["a"].comment, "; note");
        assert_eq!(fields["b"].value, FieldValue::Text("two".into()));
    }

    #[test]
    fn test_duplicate_names_keep_first_position() {
        let fields = parse_fields("a: first\nb: x\na: second");
        let keys: Vec<&str> = fields.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(fields["a"].value, FieldValue::Text("second".into()));
        assert_eq!(fields["a"].line_index, 2);
    }

    #[test]
    fn test_empty_content() {
        assert!(parse_fields("").is_empty());
        assert!(parse_fields("# only comments\n\n").is_empty());
    }
}
