use std::sync::Arc;

use contracts::domain::a001_report_template::aggregate::ReportTemplate;
use contracts::shared::data_sources::get_catalog;
use contracts::usecases::u501_generate_report::{
    GenerateReportForm, GenerationError, GenerationReceipt, GenerationRequest,
    GenerationRequestBuilder, InputKind,
};
use thiserror::Error;

use super::documents::{DocumentLibrary, FsDocumentLibrary};
use super::lookups;
use super::renderer::{HttpRenderer, RenderError, RenderJob, ReportRenderer};
use crate::domain::a001_report_template::editor::EditorError;
use crate::domain::a001_report_template::service;
use crate::domain::a001_report_template::store::TemplateStore;
use crate::shared::config::get_config;
use crate::shared::data::file_storage;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Template(#[from] EditorError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("Unknown {kind} '{id}'")]
    UnknownSelection { kind: InputKind, id: String },

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("Failed to save document: {0}")]
    Documents(anyhow::Error),
}

/// Executor для UseCase генерации отчёта
pub struct ReportGenerator {
    renderer: Arc<dyn ReportRenderer>,
    documents: Arc<dyn DocumentLibrary>,
}

impl ReportGenerator {
    pub fn new(renderer: Arc<dyn ReportRenderer>, documents: Arc<dyn DocumentLibrary>) -> Self {
        Self {
            renderer,
            documents,
        }
    }

    pub fn from_config() -> Result<Self, RenderError> {
        let renderer = HttpRenderer::new(&get_config().render)?;
        Ok(Self::new(
            Arc::new(renderer),
            Arc::new(FsDocumentLibrary::from_config()),
        ))
    }

    /// Собрать запрос из формы, отрендерить и при необходимости сохранить
    pub async fn generate(
        &self,
        store: &dyn TemplateStore,
        template_id: &str,
        form: GenerateReportForm,
    ) -> Result<GenerationReceipt, GenerateError> {
        let template = load_template(store, template_id).await?;
        let catalog = get_catalog();

        let request = GenerationRequestBuilder::from_form(&template, catalog, form)?.build()?;
        check_selections(&request)?;

        tracing::info!(
            "Generating '{}' as {} (save_to_documents={}, certified={})",
            template.base.name,
            request.output_format.as_str(),
            request.save_to_documents,
            request.certified
        );

        let job = render_job(&template, request.clone())?;
        let document = self.renderer.render(&job).await?;

        let saved_to = if request.save_to_documents {
            let path = self
                .documents
                .store(&template.base.name, &document)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to save '{}': {}", document.file_name, e);
                    GenerateError::Documents(e)
                })?;
            Some(path)
        } else {
            None
        };

        Ok(GenerationReceipt {
            request,
            document_name: document.file_name,
            size_bytes: document.bytes.len(),
            saved_to,
        })
    }
}

async fn load_template(
    store: &dyn TemplateStore,
    template_id: &str,
) -> Result<ReportTemplate, GenerateError> {
    service::get(store, template_id).await.map_err(|e| {
        match e.downcast::<EditorError>() {
            Ok(editor_error) => GenerateError::Template(editor_error),
            Err(other) => GenerateError::Template(EditorError::Store(other)),
        }
    })
}

/// Выбранные ID должны быть из справочников
fn check_selections(request: &GenerationRequest) -> Result<(), GenerateError> {
    let selections = [
        (InputKind::Project, &request.project_id),
        (InputKind::ReportingPeriod, &request.reporting_period_id),
        (InputKind::Indicator, &request.indicator_id),
    ];
    for (kind, id) in selections {
        if let Some(id) = id {
            if !lookups::contains(kind, id) {
                return Err(GenerateError::UnknownSelection {
                    kind,
                    id: id.clone(),
                });
            }
        }
    }
    Ok(())
}

fn render_job(
    template: &ReportTemplate,
    request: GenerationRequest,
) -> Result<RenderJob, GenerateError> {
    let template_file = template
        .template_file
        .clone()
        .ok_or(GenerationError::TemplateNotUsable)?;
    let template_path = file_storage::template_file_path(&template.base.id, &template_file);

    Ok(RenderJob {
        request,
        template_name: template.base.name.clone(),
        template_file,
        template_path: template_path.display().to_string(),
        bindings: template.bindings.clone(),
    })
}
