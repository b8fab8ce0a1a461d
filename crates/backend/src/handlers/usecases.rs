use axum::extract::Path;
use axum::Json;
use contracts::usecases::u501_generate_report::{
    GenerateReportForm, GenerationReceipt, InputKind, LookupOption,
};
use once_cell::sync::OnceCell;
use std::sync::Arc;

use super::ApiError;
use crate::domain::a001_report_template::store::DbTemplateStore;
use crate::usecases::u501_generate_report::{lookups, ReportGenerator};

// ============================================================================
// UseCase u501: Generate report
// ============================================================================

static GENERATOR: OnceCell<Arc<ReportGenerator>> = OnceCell::new();

fn generator() -> Result<&'static Arc<ReportGenerator>, ApiError> {
    GENERATOR
        .get_or_try_init(|| ReportGenerator::from_config().map(Arc::new))
        .map_err(ApiError::from)
}

/// GET /api/u501/lookups/:kind
pub async fn u501_lookups(Path(kind): Path<String>) -> Result<Json<Vec<LookupOption>>, ApiError> {
    let kind = InputKind::from_code(&kind)
        .ok_or_else(|| ApiError::NotFound(format!("Unknown lookup '{}'", kind)))?;
    Ok(Json(lookups::options_for(kind)))
}

/// POST /api/u501/generate/:id
pub async fn u501_generate(
    Path(id): Path<String>,
    Json(form): Json<GenerateReportForm>,
) -> Result<Json<GenerationReceipt>, ApiError> {
    let receipt = generator()?.generate(&DbTemplateStore, &id, form).await?;
    tracing::info!(
        "Generated {} ({} bytes) for template {}",
        receipt.document_name,
        receipt.size_bytes,
        id
    );
    Ok(Json(receipt))
}
