//! Template store boundary used by the editor and services

use async_trait::async_trait;
use contracts::domain::a001_report_template::aggregate::{ReportTemplate, ReportTemplateId};
use thiserror::Error;

use super::repository;
use crate::shared::data::db::get_connection;

/// Запись в хранилище уже новее той, что была открыта
#[derive(Debug, Error)]
#[error("Template {0} was changed by another request")]
pub struct VersionConflict(pub ReportTemplateId);

/// Durable storage of report templates; each call is atomic
///
/// Stored versions start at 1 and grow by one on every update.
#[async_trait]
pub trait TemplateStore: Send + Sync {
    async fn create(&self, template: &ReportTemplate) -> anyhow::Result<()>;

    /// Overwrites the record only if its stored version still equals
    /// `template.base.metadata.version`, otherwise fails with [`VersionConflict`]
    async fn update(&self, template: &ReportTemplate) -> anyhow::Result<()>;

    async fn delete(&self, id: &ReportTemplateId) -> anyhow::Result<()>;

    async fn get(&self, id: &ReportTemplateId) -> anyhow::Result<Option<ReportTemplate>>;

    async fn list(&self) -> anyhow::Result<Vec<ReportTemplate>>;
}

/// SQLite-backed store over the global connection
pub struct DbTemplateStore;

#[async_trait]
impl TemplateStore for DbTemplateStore {
    async fn create(&self, template: &ReportTemplate) -> anyhow::Result<()> {
        repository::insert(get_connection(), template).await?;
        Ok(())
    }

    async fn update(&self, template: &ReportTemplate) -> anyhow::Result<()> {
        if !repository::update(get_connection(), template).await? {
            return Err(VersionConflict(template.base.id).into());
        }
        Ok(())
    }

    async fn delete(&self, id: &ReportTemplateId) -> anyhow::Result<()> {
        repository::soft_delete(get_connection(), id).await?;
        Ok(())
    }

    async fn get(&self, id: &ReportTemplateId) -> anyhow::Result<Option<ReportTemplate>> {
        Ok(repository::find_by_id(get_connection(), id).await?)
    }

    async fn list(&self) -> anyhow::Result<Vec<ReportTemplate>> {
        Ok(repository::list_all(get_connection()).await?)
    }
}
