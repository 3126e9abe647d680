/// 编辑追踪模块
///
/// 维护三份按字段名索引的状态：
/// - 解析得到的原始字段（只读）
/// - 当前工作值（用户输入）
/// - 已提交值（上一次提交确立的基线）
///
/// 变更检测比较工作值与基线（已提交值优先，否则为原始值）的规范化形式。
use indexmap::IndexMap;
use serde_json::Value;

use crate::format::{format_for_input, InputDisplay, InputKind};
use crate::parser::{parse_fields, Field, FieldMap};
use crate::utils::EditorError;
use crate::value::{
    has_iso_date_prefix, is_numeric_one_or_zero, normalize, parse_local_datetime, to_iso_utc,
    FieldValue,
};

/// 提交结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// 没有任何变更，状态未改动
    NothingToUpdate,
    /// 已提交
    Committed {
        /// 本次写入已提交集合的字段
        updated: Vec<String>,
        /// 因恢复为原始值而移出已提交集合的字段
        reverted: Vec<String>,
    },
}

impl CommitOutcome {
    /// 是否没有变更
    pub fn is_nothing_to_update(&self) -> bool {
        matches!(self, CommitOutcome::NothingToUpdate)
    }
}

/// 编辑追踪器
#[derive(Debug, Clone, Default)]
pub struct EditTracker {
    fields: FieldMap,
    working: IndexMap<String, FieldValue>,
    committed: IndexMap<String, FieldValue>,
    /// 是否至少成功提交过一次
    has_updated: bool,
}

impl EditTracker {
    /// 以解析结果创建追踪器，工作值初始化为解析值
    pub fn new(fields: FieldMap) -> Self {
        let working = fields
            .iter()
            .map(|(name, field)| (name.clone(), field.value.clone()))
            .collect();

        Self {
            fields,
            working,
            committed: IndexMap::new(),
            has_updated: false,
        }
    }

    /// 解析文件内容并创建追踪器
    pub fn from_content(content: &str) -> Self {
        Self::new(parse_fields(content))
    }

    /// 全部字段
    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    /// 按名称获取字段
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// 字段数量
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// 是否没有字段
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// 当前工作值
    pub fn working_value(&self, name: &str) -> Option<&FieldValue> {
        self.working.get(name)
    }

    /// 设置工作值
    ///
    /// 不做校验，无效的日期文本原样保存，直到显示或提交时再解析。
    pub fn set_working_value(
        &mut self,
        name: &str,
        value: impl Into<FieldValue>,
    ) -> Result<(), EditorError> {
        if !self.fields.contains_key(name) {
            return Err(EditorError::UnknownField(name.to_string()));
        }

        self.working.insert(name.to_string(), value.into());
        Ok(())
    }

    /// 以文本形式设置工作值（命令行等纯文本输入）
    ///
    /// 布尔字段接受 `true`/`false`/`1`/`0`，其余字段按文本保存。
    pub fn set_working_text(&mut self, name: &str, text: &str) -> Result<(), EditorError> {
        let field = self
            .fields
            .get(name)
            .ok_or_else(|| EditorError::UnknownField(name.to_string()))?;

        let value = if field.value.is_bool() {
            match text.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => FieldValue::Bool(true),
                "false" | "0" => FieldValue::Bool(false),
                _ => {
                    return Err(EditorError::InvalidEdit {
                        field: name.to_string(),
                        reason: format!("expected true/false, got {:?}", text),
                    })
                }
            }
        } else {
            FieldValue::Text(text.to_string())
        };

        self.set_working_value(name, value)
    }

    /// 基线：已提交值优先，否则为原始解析值
    pub fn baseline(&self, name: &str) -> Option<&FieldValue> {
        self.committed
            .get(name)
            .or_else(|| self.fields.get(name).map(|f| &f.value))
    }

    /// 字段是否相对基线有变更
    pub fn has_changes(&self, name: &str) -> bool {
        self.fields.contains_key(name)
            && normalize(self.working.get(name)) != normalize(self.baseline(name))
    }

    /// 计算全部变更（按字段顺序）
    ///
    /// 日期字段的文本工作值会尝试解析为日期时间；解析失败时保留原文本。
    pub fn pending_changes(&self) -> IndexMap<String, FieldValue> {
        let mut changes = IndexMap::new();

        for (name, field) in &self.fields {
            let current = self.working.get(name);
            let normalized_current = normalize(current);
            let normalized_baseline = normalize(self.baseline(name));

            tracing::trace!(
                field = %name,
                current = %normalized_current,
                baseline = %normalized_baseline,
                "比较字段"
            );

            if normalized_current == normalized_baseline {
                continue;
            }

            let Some(current) = current else {
                continue;
            };

            let final_value = match current {
                FieldValue::Text(s) if field.value.is_datetime() && !s.is_empty() => {
                    parse_local_datetime(s)
                        .map(FieldValue::DateTime)
                        .unwrap_or_else(|| current.clone())
                }
                other => other.clone(),
            };
            changes.insert(name.clone(), final_value);
        }

        changes
    }

    /// 变更数量
    pub fn changed_count(&self) -> usize {
        self.fields.keys().filter(|name| self.has_changes(name)).count()
    }

    /// 检测已恢复为原始值的已提交字段
    pub fn reverted_fields(&self) -> Vec<String> {
        self.fields
            .iter()
            .filter(|(name, _)| self.committed.contains_key(*name))
            .filter(|(name, field)| {
                normalize(self.working.get(*name)) == normalize(Some(&field.value))
            })
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// 提交当前变更
    ///
    /// # 行为
    /// - 没有变更时返回 `NothingToUpdate`，不修改任何状态
    /// - 变更字段写入已提交集合，工作值同步为提交后的值
    /// - 工作值与原始值规范化相等的字段移出已提交集合
    pub fn commit(&mut self) -> CommitOutcome {
        let changes = self.pending_changes();
        if changes.is_empty() {
            tracing::info!("没有需要更新的字段");
            return CommitOutcome::NothingToUpdate;
        }

        // 恢复检测基于提交前的工作值
        let reverted_candidates: Vec<String> = self
            .fields
            .iter()
            .filter(|(name, field)| {
                normalize(self.working.get(*name)) == normalize(Some(&field.value))
            })
            .map(|(name, _)| name.clone())
            .collect();

        let updated: Vec<String> = changes.keys().cloned().collect();
        for (name, value) in changes {
            self.committed.insert(name.clone(), value.clone());
            self.working.insert(name, value);
        }

        let mut reverted = Vec::new();
        for name in reverted_candidates {
            if self.committed.shift_remove(&name).is_some() {
                tracing::debug!("字段 {} 已恢复为原始值，移出已提交集合", name);
                reverted.push(name);
            }
        }

        self.has_updated = true;
        tracing::info!(
            "提交完成: 更新 {} 个字段, 恢复 {} 个字段, 当前已提交 {} 个",
            updated.len(),
            reverted.len(),
            self.committed.len()
        );

        CommitOutcome::Committed { updated, reverted }
    }

    /// 已提交集合
    pub fn committed(&self) -> &IndexMap<String, FieldValue> {
        &self.committed
    }

    /// 字段是否在已提交集合中
    pub fn is_committed(&self, name: &str) -> bool {
        self.committed.contains_key(name)
    }

    /// 是否可以导出（提交过且已提交集合非空）
    pub fn can_export(&self) -> bool {
        self.has_updated && !self.committed.is_empty()
    }

    /// 按原始格式导出已提交值（只读）
    ///
    /// - 原始值为数字 `0`/`1` 且提交值为布尔 → 还原为 `0`/`1`
    /// - 原始值以 ISO 日期开头且提交值为日期时间 → UTC ISO 字符串
    /// - 其余原样输出
    pub fn export_values(&self) -> IndexMap<String, Value> {
        self.committed
            .iter()
            .map(|(name, value)| {
                let original = self.fields.get(name).map(|f| &f.original_value);
                let exported = match (value, original) {
                    (FieldValue::Bool(b), Some(raw)) if is_numeric_one_or_zero(raw) => {
                        Value::from(u8::from(*b))
                    }
                    (FieldValue::DateTime(dt), Some(raw)) if has_iso_date_prefix(raw) => {
                        Value::String(to_iso_utc(dt))
                    }
                    (other, _) => other.to_json(),
                };
                (name.clone(), exported)
            })
            .collect()
    }

    /// 字段的输入控件类型
    pub fn input_kind(&self, name: &str) -> Option<InputKind> {
        self.fields.get(name).map(|f| InputKind::for_value(&f.value))
    }

    /// 字段的控件显示值
    pub fn display_value(&self, name: &str) -> Option<InputDisplay> {
        let field = self.fields.get(name)?;
        let current = self.working.get(name).unwrap_or(&field.value);
        Some(format_for_input(&field.value, Some(current)))
    }

    /// 生成编辑摘要
    pub fn summary(&self) -> String {
        let mut summary = format!("Edit Variables ({} found)", self.fields.len());
        if !self.committed.is_empty() {
            summary.push_str(&format!(" ({} updated)", self.committed.len()));
        }
        summary
    }
}
