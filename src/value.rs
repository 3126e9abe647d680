/// 字段值类型与转换规则
///
/// 解析阶段把原始值（JSON 叶子或行格式中的文本）推断为带标签的 `FieldValue`，
/// 之后所有模块只根据标签分派，不再重新推断类型。
///
/// 日期时间统一使用本地挂钟时间（`DateTime<Local>`）：
/// - 规范显示格式为 `YYYY-MM-DDTHH:MM:SS`
/// - 导出格式为 UTC 的 `YYYY-MM-DDTHH:MM:SS.mmmZ`
use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, Duration, Local, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use regex::Regex;
use serde_json::{Number, Value};

/// 完整 ISO 时间格式（可选毫秒与 `Z` 后缀）
static ISO_INSTANT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^([0-9]{4})-([0-9]{2})-([0-9]{2})T([0-9]{2}):([0-9]{2}):([0-9]{2})(?:\.([0-9]{3}))?(Z?)$",
    )
    .expect("invalid ISO instant regex")
});

/// 用户输入的本地日期时间（秒可省略，只匹配前缀）
static LOCAL_DATETIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{4})-([0-9]{2})-([0-9]{2})T([0-9]{2}):([0-9]{2})(?::([0-9]{2}))?")
        .expect("invalid local datetime regex")
});

/// 比较时识别日期样式的字符串
static DATETIME_LIKE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}(:[0-9]{2})?")
        .expect("invalid datetime-like regex")
});

/// 导出时判断原始值是否以日期开头
static ISO_DATE_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}T").expect("invalid ISO date prefix regex"));

/// 规范的本地日期时间格式
pub const CANONICAL_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// 带类型标签的字段值
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// 布尔值（包括由 `1`/`0` 推断而来的值）
    Bool(bool),
    /// JSON 数字
    Number(Number),
    /// 文本
    Text(String),
    /// 本地日期时间
    DateTime(DateTime<Local>),
    /// 其他 JSON 叶子（`null`、数组），原样保留
    Other(Value),
}

impl FieldValue {
    /// 是否为布尔值
    pub fn is_bool(&self) -> bool {
        matches!(self, FieldValue::Bool(_))
    }

    /// 是否为日期时间
    pub fn is_datetime(&self) -> bool {
        matches!(self, FieldValue::DateTime(_))
    }

    /// 是否为数字
    pub fn is_number(&self) -> bool {
        matches!(self, FieldValue::Number(_))
    }

    /// 获取文本内容
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// 获取日期时间
    pub fn as_datetime(&self) -> Option<&DateTime<Local>> {
        match self {
            FieldValue::DateTime(dt) => Some(dt),
            _ => None,
        }
    }

    /// 真值判断
    ///
    /// 空字符串、`false`、`0`、`NaN` 与 `null` 为假，其余为真
    pub fn is_truthy(&self) -> bool {
        match self {
            FieldValue::Bool(b) => *b,
            FieldValue::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
            FieldValue::Text(s) => !s.is_empty(),
            FieldValue::DateTime(_) => true,
            FieldValue::Other(v) => !v.is_null(),
        }
    }

    /// 转换为 JSON 值
    ///
    /// 日期时间输出为 UTC ISO 字符串
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Number(n) => Value::Number(n.clone()),
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::DateTime(dt) => Value::String(to_iso_utc(dt)),
            FieldValue::Other(v) => v.clone(),
        }
    }

    /// 类型名称（用于摘要显示）
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Bool(_) => "boolean",
            FieldValue::Number(_) => "number",
            FieldValue::Text(_) => "string",
            FieldValue::DateTime(_) => "datetime",
            FieldValue::Other(Value::Null) => "null",
            FieldValue::Other(_) => "array",
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Number(n) => f.write_str(&number_to_string(n)),
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::DateTime(dt) => f.write_str(&render_canonical(dt)),
            FieldValue::Other(v) => f.write_str(&json_leaf_to_string(v, true)),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<DateTime<Local>> for FieldValue {
    fn from(dt: DateTime<Local>) -> Self {
        FieldValue::DateTime(dt)
    }
}

/// 解析阶段的类型推断
///
/// 规则按顺序应用：
/// 1. 数字或字符串 `1`/`0` → 布尔值
/// 2. 完整 ISO 时间字符串且日期有效 → 日期时间
/// 3. 其余原样保留
///
/// 只在解析时调用，用户编辑的值不经过这里。
pub fn coerce(raw: &Value) -> FieldValue {
    if is_one_or_zero(raw) {
        return FieldValue::Bool(matches_one(raw));
    }

    match raw {
        Value::String(s) => match parse_iso_instant(s) {
            Some(dt) => FieldValue::DateTime(dt),
            None => FieldValue::Text(s.clone()),
        },
        Value::Bool(b) => FieldValue::Bool(*b),
        Value::Number(n) => FieldValue::Number(n.clone()),
        other => FieldValue::Other(other.clone()),
    }
}

/// 原始值是否恰好为 `0`/`1`（数字或字符串）
pub fn is_one_or_zero(raw: &Value) -> bool {
    match raw {
        Value::Number(n) => matches!(n.as_f64(), Some(f) if f == 0.0 || f == 1.0),
        Value::String(s) => s == "0" || s == "1",
        _ => false,
    }
}

fn matches_one(raw: &Value) -> bool {
    match raw {
        Value::Number(n) => n.as_f64() == Some(1.0),
        Value::String(s) => s == "1",
        _ => false,
    }
}

/// 原始值是否为数字 `0`/`1`（导出时映射回数字）
pub fn is_numeric_one_or_zero(raw: &Value) -> bool {
    matches!(raw, Value::Number(_)) && is_one_or_zero(raw)
}

/// 原始值是否为以 ISO 日期开头的字符串
pub fn has_iso_date_prefix(raw: &Value) -> bool {
    matches!(raw, Value::String(s) if ISO_DATE_PREFIX_RE.is_match(s))
}

/// 解析完整 ISO 时间字符串
///
/// 不带 `Z` 按本地时间解释，带 `Z` 按 UTC 解释后转换为本地时间。
/// 分量需在 ISO 允许的范围内（月 1-12、日 1-31、时 0-24、分秒 0-59），
/// 日期在当月不存在时向后进位（`2021-02-30` → 3 月 2 日）。
pub fn parse_iso_instant(s: &str) -> Option<DateTime<Local>> {
    let caps = ISO_INSTANT_RE.captures(s)?;
    let field = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());

    let year = caps.get(1)?.as_str().parse::<i32>().ok()?;
    let (month, day) = (field(2)?, field(3)?);
    let (hour, minute, second) = (field(4)?, field(5)?, field(6)?);
    let in_range = (1..=12).contains(&month)
        && (1..=31).contains(&day)
        && hour <= 24
        && minute <= 59
        && second <= 59;
    if !in_range {
        return None;
    }

    let millis = field(7).unwrap_or(0);
    let naive = naive_from_components(year, month, day, hour, minute, second, millis)?;

    let is_utc = caps.get(8).is_some_and(|m| !m.as_str().is_empty());
    if is_utc {
        Some(Utc.from_utc_datetime(&naive).with_timezone(&Local))
    } else {
        local_from_naive(&naive)
    }
}

/// 解析用户输入的本地日期时间
///
/// 输入需以 `YYYY-MM-DDTHH:MM` 开头，秒可省略（默认 0），其后内容忽略。
/// 各分量直接作为本地挂钟时间构造，不做时区换算；超出范围的分量向前进位
/// （`2019-13-01T00:00` → 2020-01-01，`24:00` → 次日零点）。
pub fn parse_local_datetime(s: &str) -> Option<DateTime<Local>> {
    if s.trim().is_empty() {
        return None;
    }

    let caps = LOCAL_DATETIME_RE.captures(s)?;
    let field = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());

    let year = caps.get(1)?.as_str().parse::<i32>().ok()?;
    let seconds = field(6).unwrap_or(0);
    let naive = naive_from_components(year, field(2)?, field(3)?, field(4)?, field(5)?, seconds, 0)?;

    local_from_naive(&naive)
}

/// 按分量构造挂钟时间，超出范围的分量逐级进位
///
/// 月为 0 时退到上一年 12 月，日为 0 时退到上月最后一天。
fn naive_from_components(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
    millis: u32,
) -> Option<NaiveDateTime> {
    let months = i64::from(year) * 12 + i64::from(month) - 1;
    let year = i32::try_from(months.div_euclid(12)).ok()?;
    let month = u32::try_from(months.rem_euclid(12)).ok()? + 1;

    let offset = Duration::days(i64::from(day) - 1)
        + Duration::hours(i64::from(hour))
        + Duration::minutes(i64::from(minute))
        + Duration::seconds(i64::from(second))
        + Duration::milliseconds(i64::from(millis));

    NaiveDate::from_ymd_opt(year, month, 1)?
        .and_hms_opt(0, 0, 0)?
        .checked_add_signed(offset)
}

/// 本地挂钟时间转换为带时区的时间
///
/// 重复的时刻取较早者；落在跳变间隙中的时刻按跳变前的偏移解释，结果顺延到间隙之后。
fn local_from_naive(naive: &NaiveDateTime) -> Option<DateTime<Local>> {
    match Local.from_local_datetime(naive) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => {
            let before = Local
                .from_local_datetime(&(*naive - Duration::days(1)))
                .earliest()?;
            before
                .offset()
                .from_local_datetime(naive)
                .single()
                .map(|dt| dt.with_timezone(&Local))
        }
    }
}

/// 规范显示：`YYYY-MM-DDTHH:MM:SS`（本地时间）
pub fn render_canonical(dt: &DateTime<Local>) -> String {
    dt.format(CANONICAL_DATETIME_FORMAT).to_string()
}

/// 导出格式：UTC 时间，毫秒精度，`Z` 结尾
pub fn to_iso_utc(dt: &DateTime<Local>) -> String {
    dt.with_timezone(&Utc)
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
}

/// 比较用的规范化形式
///
/// - 日期时间 → 规范本地字符串
/// - 16 位的日期样式字符串（缺秒）→ 补 `:00`
/// - 其余 → 通用字符串转换；缺失值为 `undefined`
pub fn normalize(value: Option<&FieldValue>) -> String {
    match value {
        None => "undefined".to_string(),
        Some(FieldValue::DateTime(dt)) => render_canonical(dt),
        Some(FieldValue::Text(s)) if DATETIME_LIKE_RE.is_match(s) && s.len() == 16 => {
            format!("{}:00", s)
        }
        Some(other) => other.to_string(),
    }
}

/// 数字转字符串：整数值的浮点数不带小数部分
pub fn number_to_string(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }

    match n.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e21 => format!("{:.0}", f),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

/// JSON 叶子的通用字符串形式
///
/// 数组按元素逗号连接；嵌套在数组内的 `null` 为空串
fn json_leaf_to_string(value: &Value, top_level: bool) -> String {
    match value {
        Value::Null if top_level => "null".to_string(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number_to_string(n),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| json_leaf_to_string(item, false))
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use serde_json::json;

    #[test]
    fn test_coerce_booleans() {
        assert_eq!(coerce(&json!("1")), FieldValue::Bool(true));
        assert_eq!(coerce(&json!("0")), FieldValue::Bool(false));
        assert_eq!(coerce(&json!(1)), FieldValue::Bool(true));
        assert_eq!(coerce(&json!(0)), FieldValue::Bool(false));
        assert_eq!(coerce(&json!(1.0)), FieldValue::Bool(true));
        assert_eq!(coerce(&json!(2)), FieldValue::Number(2.into()));
    }

    #[test]
    fn test_coerce_datetime() {
        let value = coerce(&json!("2021-05-01T00:00:00"));
        let dt = value.as_datetime().expect("应解析为日期时间");
        assert_eq!((dt.year(), dt.month(), dt.day()), (2021, 5, 1));
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (0, 0, 0));
        assert_eq!(render_canonical(dt), "2021-05-01T00:00:00");
    }

    #[test]
    fn test_coerce_utc_datetime() {
        let value = coerce(&json!("2021-05-01T12:30:00.250Z"));
        let dt = value.as_datetime().expect("应解析为日期时间");
        assert_eq!(to_iso_utc(dt), "2021-05-01T12:30:00.250Z");
    }

    #[test]
    fn test_coerce_passthrough() {
        assert_eq!(coerce(&json!("hello")), FieldValue::Text("hello".into()));
        assert_eq!(coerce(&json!(true)), FieldValue::Bool(true));
        assert_eq!(coerce(&json!(null)), FieldValue::Other(Value::Null));
        // 分量超出范围或格式不完整时保持字符串
        assert_eq!(
            coerce(&json!("2021-13-01T00:00:00")),
            FieldValue::Text("2021-13-01T00:00:00".into())
        );
        assert_eq!(
            coerce(&json!("2021-05-01T00:00")),
            FieldValue::Text("2021-05-01T00:00".into())
        );
    }

    #[test]
    fn test_parse_local_datetime() {
        let dt = parse_local_datetime("2019-09-01T00:01").unwrap();
        assert_eq!(render_canonical(&dt), "2019-09-01T00:01:00");

        let dt = parse_local_datetime("2019-09-01T23:59:30.000Z").unwrap();
        assert_eq!(render_canonical(&dt), "2019-09-01T23:59:30");

        assert!(parse_local_datetime("").is_none());
        assert!(parse_local_datetime("2019-09-01").is_none());
        assert!(parse_local_datetime("not a date").is_none());
    }

    #[test]
    fn test_coerce_rolls_day_overflow_forward() {
        let value = coerce(&json!("2021-02-30T00:00:00"));
        let dt = value.as_datetime().expect("应解析为日期时间");
        assert_eq!(render_canonical(dt), "2021-03-02T00:00:00");

        let value = coerce(&json!("2021-05-01T24:00:00"));
        assert_eq!(normalize(Some(&value)), "2021-05-02T00:00:00");
    }

    #[test]
    fn test_parse_local_datetime_overflow() {
        let dt = parse_local_datetime("2019-13-01T00:00").unwrap();
        assert_eq!(render_canonical(&dt), "2020-01-01T00:00:00");

        let dt = parse_local_datetime("2019-09-01T24:00").unwrap();
        assert_eq!(render_canonical(&dt), "2019-09-02T00:00:00");

        let dt = parse_local_datetime("2021-02-30T10:15").unwrap();
        assert_eq!(render_canonical(&dt), "2021-03-02T10:15:00");

        let dt = parse_local_datetime("2021-03-00T00:00:75").unwrap();
        assert_eq!(render_canonical(&dt), "2021-02-28T00:01:15");

        let dt = parse_local_datetime("2021-00-15T00:00").unwrap();
        assert_eq!(render_canonical(&dt), "2020-12-15T00:00:00");
    }

    #[test]
    fn test_canonical_round_trip() {
        let original = parse_local_datetime("2024-02-29T13:45:07").unwrap();
        let reparsed = parse_local_datetime(&render_canonical(&original)).unwrap();
        let a = FieldValue::DateTime(original);
        let b = FieldValue::DateTime(reparsed);
        assert_eq!(normalize(Some(&a)), normalize(Some(&b)));
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Some(&"2019-09-01T00:01".into())), "2019-09-01T00:01:00");
        assert_eq!(normalize(Some(&"2019-09-01T00:01:00".into())), "2019-09-01T00:01:00");
        assert_eq!(normalize(Some(&FieldValue::Bool(true))), "true");
        assert_eq!(normalize(Some(&FieldValue::Number(3.into()))), "3");
        assert_eq!(normalize(Some(&FieldValue::Other(json!([1, null, "a"])))), "1,,a");
        assert_eq!(normalize(None), "undefined");
    }

    #[test]
    fn test_number_to_string() {
        assert_eq!(number_to_string(&Number::from_f64(2.0).unwrap()), "2");
        assert_eq!(number_to_string(&Number::from_f64(2.5).unwrap()), "2.5");
        assert_eq!(number_to_string(&Number::from(-7)), "-7");
    }

    #[test]
    fn test_truthiness() {
        assert!(!FieldValue::Text(String::new()).is_truthy());
        assert!(FieldValue::Text("false".into()).is_truthy());
        assert!(!FieldValue::Number(0.into()).is_truthy());
        assert!(!FieldValue::Other(Value::Null).is_truthy());
        assert!(FieldValue::Other(json!([])).is_truthy());
    }

    #[test]
    fn test_export_predicates() {
        assert!(is_numeric_one_or_zero(&json!(1)));
        assert!(!is_numeric_one_or_zero(&json!("1")));
        assert!(has_iso_date_prefix(&json!("2021-05-01T00:00:00")));
        assert!(!has_iso_date_prefix(&json!("2021-05-01")));
    }
}
