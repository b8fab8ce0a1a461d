//! Ошибки HTTP-слоя и их коды ответа

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use contracts::domain::a001_report_template::binding::BindingError;
use contracts::domain::a001_report_template::template_file::TemplateFileError;
use contracts::shared::data_sources::CatalogError;
use contracts::usecases::common::UseCaseError;
use contracts::usecases::u501_generate_report::GenerationError;
use thiserror::Error;

use crate::domain::a001_report_template::editor::EditorError;
use crate::usecases::u501_generate_report::renderer::RenderError;
use crate::usecases::u501_generate_report::GenerateError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    UnsupportedFileType(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Render(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::UnsupportedFileType(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Render(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> UseCaseError {
        match self {
            Self::BadRequest(m) => UseCaseError::validation(m.clone()),
            Self::UnsupportedFileType(m) => UseCaseError::unsupported_file_type(m.clone()),
            Self::NotFound(m) => UseCaseError::not_found(m.clone()),
            Self::Conflict(m) => UseCaseError::conflict(m.clone()),
            Self::Render(m) => UseCaseError::external("Render service failed").with_details(m.clone()),
            // детали только в логе
            Self::Internal(_) => UseCaseError::internal("Internal server error"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("{} {}", status.as_u16(), self);
        } else {
            tracing::warn!("{} {}", status.as_u16(), self);
        }
        (status, Json(self.body())).into_response()
    }
}

impl From<EditorError> for ApiError {
    fn from(e: EditorError) -> Self {
        let message = e.to_string();
        match e {
            EditorError::File(TemplateFileError::UnsupportedFileType(_)) => {
                Self::UnsupportedFileType(message)
            }
            EditorError::File(TemplateFileError::EmptyName) => Self::BadRequest(message),
            EditorError::Binding(BindingError::ConstraintViolation { .. }) => Self::Conflict(message),
            EditorError::Binding(BindingError::IndexOutOfRange { .. }) => Self::BadRequest(message),
            EditorError::Catalog(CatalogError::NotFound(_)) => Self::BadRequest(message),
            EditorError::Catalog(CatalogError::DuplicateId(_)) => Self::Internal(message),
            EditorError::NotPersisted | EditorError::Conflict(_) => Self::Conflict(message),
            EditorError::Deleted(_) | EditorError::NotFound(_) => Self::NotFound(message),
            EditorError::Validation(_) => Self::BadRequest(message),
            EditorError::Store(_) => Self::Internal(message),
        }
    }
}

impl From<RenderError> for ApiError {
    fn from(e: RenderError) -> Self {
        Self::Render(e.to_string())
    }
}

impl From<GenerateError> for ApiError {
    fn from(e: GenerateError) -> Self {
        match e {
            GenerateError::Template(e) => e.into(),
            GenerateError::Generation(GenerationError::TemplateNotUsable) => {
                Self::Conflict(GenerationError::TemplateNotUsable.to_string())
            }
            GenerateError::Generation(e) => Self::BadRequest(e.to_string()),
            e @ GenerateError::UnknownSelection { .. } => Self::BadRequest(e.to_string()),
            GenerateError::Render(e) => e.into(),
            e @ GenerateError::Documents(_) => Self::Internal(e.to_string()),
        }
    }
}

/// Сервисы возвращают anyhow; доменные ошибки восстанавливаются через downcast
impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        match e.downcast::<EditorError>() {
            Ok(editor) => editor.into(),
            Err(e) => Self::Internal(format!("{:#}", e)),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        Self::BadRequest(format!("Invalid multipart body: {}", e))
    }
}
