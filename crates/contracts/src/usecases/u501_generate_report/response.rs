use serde::{Deserialize, Serialize};

use super::request::GenerationRequest;

/// Результат успешной генерации
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReceipt {
    pub request: GenerationRequest,
    /// Имя файла документа
    pub document_name: String,
    pub size_bytes: usize,
    /// Путь в библиотеке документов, если сохранялось
    pub saved_to: Option<String>,
}

/// Элемент выпадающего списка выбора (проект, период, индикатор)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupOption {
    pub id: String,
    pub name: String,
}

impl LookupOption {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
        }
    }
}
