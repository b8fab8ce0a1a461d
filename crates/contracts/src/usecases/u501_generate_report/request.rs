use serde::{Deserialize, Serialize};

use super::eligibility::CollectedInputs;

/// Формат результата генерации
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Pdf,
    Word,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Pdf => "pdf",
            OutputFormat::Word => "word",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Pdf => "pdf",
            OutputFormat::Word => "docx",
        }
    }
}

/// Форма диалога генерации, как её присылает клиент
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateReportForm {
    /// Выбранные проект / отчётный период / индикатор
    #[serde(default)]
    pub collected: CollectedInputs,

    #[serde(default)]
    pub output_format: OutputFormat,

    /// Сохранить результат в документы
    #[serde(default)]
    pub save_to_documents: bool,

    /// Флаг "я удостоверяю этот отчёт"
    #[serde(default)]
    pub certify: bool,

    /// Явное подтверждение удостоверения
    #[serde(default)]
    pub certification_confirmed: bool,
}

/// Запрос на генерацию, передаваемый сервису рендеринга.
/// Поля ID присутствуют только для требуемых входных данных.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub template_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reporting_period_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indicator_id: Option<String>,
    pub output_format: OutputFormat,
    pub save_to_documents: bool,
    pub certified: bool,
}
