//! Клиент внешнего сервиса рендеринга документов

use std::time::Duration;

use async_trait::async_trait;
use contracts::domain::a001_report_template::binding::TemplateBinding;
use contracts::domain::a001_report_template::template_file::TemplateFile;
use contracts::usecases::u501_generate_report::GenerationRequest;
use serde::Serialize;
use thiserror::Error;

use super::documents::sanitize_name;
use crate::shared::config::RenderConfig;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Render service is not configured")]
    NotConfigured,

    #[error("Render service unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Render service returned {status}: {message}")]
    Service { status: u16, message: String },
}

/// Тело запроса к сервису рендеринга
#[derive(Debug, Clone, Serialize)]
pub struct RenderJob {
    pub request: GenerationRequest,
    pub template_name: String,
    pub template_file: TemplateFile,
    /// Путь к файлу шаблона в хранилище
    pub template_path: String,
    pub bindings: Vec<TemplateBinding>,
}

impl RenderJob {
    pub fn document_name(&self) -> String {
        format!(
            "{}.{}",
            sanitize_name(&self.template_name),
            self.request.output_format.extension()
        )
    }
}

#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait ReportRenderer: Send + Sync {
    async fn render(&self, job: &RenderJob) -> Result<RenderedDocument, RenderError>;
}

/// POSTs the job as JSON and takes the response body as the document
pub struct HttpRenderer {
    client: reqwest::Client,
    endpoint: Option<String>,
}

impl HttpRenderer {
    pub fn new(config: &RenderConfig) -> Result<Self, RenderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone().filter(|e| !e.trim().is_empty()),
        })
    }
}

#[async_trait]
impl ReportRenderer for HttpRenderer {
    async fn render(&self, job: &RenderJob) -> Result<RenderedDocument, RenderError> {
        let endpoint = self.endpoint.as_deref().ok_or(RenderError::NotConfigured)?;

        tracing::info!(
            "POST {} template={} format={}",
            endpoint,
            job.request.template_id,
            job.request.output_format.as_str()
        );

        let response = self.client.post(endpoint).json(job).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::error!("Render service failed with {}: {}", status, message);
            return Err(RenderError::Service {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response.bytes().await?.to_vec();
        tracing::info!("Rendered {} ({} bytes)", job.document_name(), bytes.len());

        Ok(RenderedDocument {
            file_name: job.document_name(),
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::usecases::u501_generate_report::OutputFormat;

    fn job() -> RenderJob {
        RenderJob {
            request: GenerationRequest {
                template_id: "t-1".into(),
                project_id: Some("proj-1".into()),
                reporting_period_id: None,
                indicator_id: None,
                output_format: OutputFormat::Word,
                save_to_documents: false,
                certified: false,
            },
            template_name: "QRS report".into(),
            template_file: TemplateFile::from_filename("QRS template.docx").unwrap(),
            template_path: "target/templates/t-1.docx".into(),
            bindings: vec![],
        }
    }

    #[test]
    fn test_document_name() {
        assert_eq!(job().document_name(), "QRS report.docx");
    }

    #[tokio::test]
    async fn test_missing_endpoint() {
        let renderer = HttpRenderer::new(&RenderConfig::default()).unwrap();
        assert!(matches!(
            renderer.render(&job()).await,
            Err(RenderError::NotConfigured)
        ));
    }
}
