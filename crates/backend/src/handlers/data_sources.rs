use axum::Json;
use contracts::shared::data_sources::catalog::to_group_dtos;
use contracts::shared::data_sources::{get_catalog, DataSourceGroupDto};

/// GET /api/data_sources
pub async fn list_grouped() -> Json<Vec<DataSourceGroupDto>> {
    Json(to_group_dtos(&get_catalog().group_by_category()))
}
