use axum::extract::{Multipart, Path};
use axum::http::StatusCode;
use axum::Json;
use contracts::domain::a001_report_template::aggregate::{ReportTemplate, ReportTemplateListItem};
use contracts::domain::a001_report_template::binding::TemplateBinding;
use contracts::shared::data_sources::DataSourceGroupDto;
use contracts::usecases::u501_generate_report::InputKind;

use super::ApiError;
use crate::domain::a001_report_template::service::{
    self, AddBindingDto, RenameKeyDto, ReportTemplateDetails, TemplateFieldsDto, UploadedFile,
};
use crate::domain::a001_report_template::store::DbTemplateStore;

const STORE: DbTemplateStore = DbTemplateStore;

/// Файл и поля формы загрузки
async fn read_upload(mut multipart: Multipart) -> Result<(UploadedFile, TemplateFieldsDto), ApiError> {
    let mut upload = None;
    let mut fields = TemplateFieldsDto::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field
                    .file_name()
                    .map(str::to_string)
                    .ok_or_else(|| ApiError::BadRequest("File part has no file name".into()))?;
                let bytes = field.bytes().await?.to_vec();
                upload = Some(UploadedFile { filename, bytes });
            }
            "name" => fields.name = Some(field.text().await?),
            "description" => fields.description = Some(Some(field.text().await?)),
            "group" => fields.group = Some(Some(field.text().await?)),
            other => tracing::warn!("Ignoring multipart field '{}'", other),
        }
    }

    let upload = upload.ok_or_else(|| ApiError::BadRequest("Missing 'file' part".into()))?;
    Ok((upload, fields))
}

/// GET /api/report_template
pub async fn list_all() -> Result<Json<Vec<ReportTemplateListItem>>, ApiError> {
    Ok(Json(service::list_all(&STORE).await?))
}

/// GET /api/report_template/:id
pub async fn get_by_id(Path(id): Path<String>) -> Result<Json<ReportTemplateDetails>, ApiError> {
    Ok(Json(service::get_details(&STORE, &id).await?))
}

/// POST /api/report_template (multipart: file, name, description, group)
pub async fn create(multipart: Multipart) -> Result<(StatusCode, Json<ReportTemplate>), ApiError> {
    let (upload, fields) = read_upload(multipart).await?;
    let template = service::create_from_upload(&STORE, upload, fields).await?;
    Ok((StatusCode::CREATED, Json(template)))
}

/// POST /api/report_template/:id/file
pub async fn replace_file(
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<ReportTemplate>, ApiError> {
    let (upload, _) = read_upload(multipart).await?;
    Ok(Json(service::replace_file(&STORE, &id, upload).await?))
}

/// PUT /api/report_template/:id/fields
pub async fn update_fields(
    Path(id): Path<String>,
    Json(dto): Json<TemplateFieldsDto>,
) -> Result<Json<ReportTemplate>, ApiError> {
    Ok(Json(service::update_fields(&STORE, &id, dto).await?))
}

/// DELETE /api/report_template/:id
pub async fn delete(Path(id): Path<String>) -> Result<StatusCode, ApiError> {
    service::delete(&STORE, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/report_template/:id/bindings
pub async fn add_binding(
    Path(id): Path<String>,
    Json(dto): Json<AddBindingDto>,
) -> Result<(StatusCode, Json<TemplateBinding>), ApiError> {
    let binding = service::add_binding(&STORE, &id, dto).await?;
    Ok((StatusCode::CREATED, Json(binding)))
}

/// DELETE /api/report_template/:id/bindings/:index
pub async fn remove_binding(
    Path((id, index)): Path<(String, usize)>,
) -> Result<Json<TemplateBinding>, ApiError> {
    Ok(Json(service::remove_binding(&STORE, &id, index).await?))
}

/// PUT /api/report_template/:id/bindings/:index
pub async fn rename_binding_key(
    Path((id, index)): Path<(String, usize)>,
    Json(dto): Json<RenameKeyDto>,
) -> Result<Json<ReportTemplate>, ApiError> {
    Ok(Json(
        service::rename_binding_key(&STORE, &id, index, dto).await?,
    ))
}

/// GET /api/report_template/:id/eligible_sources
pub async fn eligible_sources(
    Path(id): Path<String>,
) -> Result<Json<Vec<DataSourceGroupDto>>, ApiError> {
    Ok(Json(service::eligible_sources(&STORE, &id).await?))
}

/// GET /api/report_template/:id/required_inputs
pub async fn required_inputs(Path(id): Path<String>) -> Result<Json<Vec<InputKind>>, ApiError> {
    Ok(Json(service::required_inputs_of(&STORE, &id).await?))
}

/// POST /api/report_template/testdata
pub async fn insert_test_data() -> Result<StatusCode, ApiError> {
    service::insert_test_data(&STORE).await?;
    Ok(StatusCode::OK)
}
