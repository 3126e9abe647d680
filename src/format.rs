/// 输入控件的显示格式
///
/// 根据字段的原始类型与当前工作值，生成输入控件应显示的内容。
use chrono::{DateTime, Local};

use crate::value::{parse_local_datetime, render_canonical, FieldValue};

/// 输入控件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Checkbox,
    DateTimeLocal,
    Number,
    Text,
}

impl InputKind {
    /// 根据字段的原始类型选择控件
    pub fn for_value(original: &FieldValue) -> Self {
        match original {
            FieldValue::Bool(_) => InputKind::Checkbox,
            FieldValue::DateTime(_) => InputKind::DateTimeLocal,
            FieldValue::Number(_) => InputKind::Number,
            _ => InputKind::Text,
        }
    }

    /// 占位提示文本（复选框没有）
    pub fn placeholder(&self) -> Option<&'static str> {
        match self {
            InputKind::Checkbox => None,
            InputKind::DateTimeLocal => Some("YYYY-MM-DDTHH:MM"),
            InputKind::Number | InputKind::Text => Some("Enter value..."),
        }
    }
}

/// 控件显示值
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputDisplay {
    /// 复选框状态
    Toggle(bool),
    /// 文本框内容
    Text(String),
}

impl InputDisplay {
    /// 复选框旁的说明文字
    pub fn caption(&self) -> Option<&'static str> {
        match self {
            InputDisplay::Toggle(true) => Some("Enabled"),
            InputDisplay::Toggle(false) => Some("Disabled"),
            InputDisplay::Text(_) => None,
        }
    }

    /// 文本内容
    pub fn as_text(&self) -> Option<&str> {
        match self {
            InputDisplay::Text(s) => Some(s),
            InputDisplay::Toggle(_) => None,
        }
    }
}

/// 生成控件显示值
///
/// - 布尔字段：按真值显示为勾选/未勾选
/// - 日期字段：日期值显示规范格式；非空字符串尝试解析，失败则原样返回（允许继续输入）；
///   缺失时回退到原始日期
/// - 其他：通用字符串转换，缺失值显示为空
pub fn format_for_input(original: &FieldValue, current: Option<&FieldValue>) -> InputDisplay {
    match original {
        FieldValue::Bool(_) => InputDisplay::Toggle(current.unwrap_or(original).is_truthy()),
        FieldValue::DateTime(dt) => InputDisplay::Text(format_datetime(dt, current)),
        _ => InputDisplay::Text(match current {
            None | Some(FieldValue::Other(serde_json::Value::Null)) => String::new(),
            Some(value) => value.to_string(),
        }),
    }
}

fn format_datetime(original: &DateTime<Local>, current: Option<&FieldValue>) -> String {
    match current {
        Some(FieldValue::DateTime(dt)) => render_canonical(dt),
        Some(FieldValue::Text(s)) if !s.is_empty() => match parse_local_datetime(s) {
            Some(dt) => render_canonical(&dt),
            None => s.clone(),
        },
        _ => render_canonical(original),
    }
}
