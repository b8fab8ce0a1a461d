use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::data_sources::{DataSourceCategory, DataSourceDescriptor};

/// Ключ, если ни default_key, ни label не дали ни одного допустимого символа
const FALLBACK_KEY: &str = "source";

/// Привязка источника данных к шаблону
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateBinding {
    /// ID источника из каталога
    pub data_source_id: String,
    /// Ключ, под которым данные источника доступны в документе
    pub key: String,
}

impl TemplateBinding {
    /// Привязка с ключом, выведенным из описания источника
    pub fn for_source(descriptor: &DataSourceDescriptor) -> Self {
        Self {
            data_source_id: descriptor.id.to_string(),
            key: derive_key(descriptor),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    #[error("Template already has a {category} data source; cannot add {data_source_id}")]
    ConstraintViolation {
        category: DataSourceCategory,
        data_source_id: String,
    },

    #[error("Binding index {index} out of range (template has {len} bindings)")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Ключ привязки по умолчанию.
///
/// Берётся default_key источника, иначе label. Результат всегда приводится к
/// виду `[a-z0-9_]+` без подчёркиваний по краям.
pub fn derive_key(descriptor: &DataSourceDescriptor) -> String {
    let source = descriptor.default_key.unwrap_or(descriptor.label);
    let key = slugify(source);
    if key.is_empty() {
        let from_label = slugify(descriptor.label);
        if from_label.is_empty() {
            return FALLBACK_KEY.to_string();
        }
        return from_label;
    }
    key
}

/// Lowercase, runs of non-alphanumeric characters collapsed to one `_`,
/// leading and trailing `_` trimmed.
pub fn slugify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_sep = false;
    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(ch.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    out
}
