//! Template editor
//!
//! Один редактор на одно открытие шаблона. Состояние хранится в
//! `EditorState`: до первой загрузки файла шаблон существует только в памяти,
//! после неё каждое изменение сразу сохраняется в хранилище.

use contracts::domain::a001_report_template::aggregate::{ReportTemplate, ReportTemplateId};
use contracts::domain::a001_report_template::binding::{BindingError, TemplateBinding};
use contracts::domain::a001_report_template::template_file::{TemplateFile, TemplateFileError};
use contracts::shared::data_sources::catalog::{group, to_group_dtos};
use contracts::shared::data_sources::{CatalogError, DataSourceCatalog, DataSourceGroupDto};
use thiserror::Error;

use super::store::{TemplateStore, VersionConflict};

#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    File(#[from] TemplateFileError),

    #[error(transparent)]
    Binding(#[from] BindingError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Template has not been saved yet")]
    NotPersisted,

    #[error("Template {0} has been deleted")]
    Deleted(ReportTemplateId),

    #[error("Template {0} not found")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Template {0} was changed by another request, reopen it and retry")]
    Conflict(ReportTemplateId),

    #[error("Template store failure: {0}")]
    Store(anyhow::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditorState {
    /// Новый шаблон, в хранилище ещё не записан
    Unsaved(ReportTemplate),
    /// Сохранён; изменения записываются сразу
    Persisted(ReportTemplate),
    Deleted(ReportTemplateId),
}

impl EditorState {
    pub fn template(&self) -> Option<&ReportTemplate> {
        match self {
            EditorState::Unsaved(t) | EditorState::Persisted(t) => Some(t),
            EditorState::Deleted(_) => None,
        }
    }

    pub fn id(&self) -> ReportTemplateId {
        match self {
            EditorState::Unsaved(t) | EditorState::Persisted(t) => t.base.id,
            EditorState::Deleted(id) => *id,
        }
    }
}

/// Result of leaving the editor
#[derive(Debug, Clone, PartialEq)]
pub enum EditorOutcome {
    Saved(ReportTemplate),
    /// Never persisted, nothing to keep
    Discarded,
    Deleted(ReportTemplateId),
}

pub struct TemplateEditor<'a> {
    store: &'a dyn TemplateStore,
    catalog: &'a DataSourceCatalog,
    state: EditorState,
}

impl<'a> TemplateEditor<'a> {
    /// Новый шаблон. Хранилище не трогается до `attach_file`.
    pub fn create(store: &'a dyn TemplateStore, catalog: &'a DataSourceCatalog) -> Self {
        Self {
            store,
            catalog,
            state: EditorState::Unsaved(ReportTemplate::new_draft()),
        }
    }

    /// Открыть сохранённый шаблон
    pub async fn open(
        store: &'a dyn TemplateStore,
        catalog: &'a DataSourceCatalog,
        id: &ReportTemplateId,
    ) -> Result<TemplateEditor<'a>, EditorError> {
        let template = store
            .get(id)
            .await
            .map_err(EditorError::Store)?
            .ok_or_else(|| EditorError::NotFound(id.to_string()))?;

        Ok(Self {
            store,
            catalog,
            state: EditorState::Persisted(template),
        })
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn template(&self) -> Option<&ReportTemplate> {
        self.state.template()
    }

    pub fn id(&self) -> ReportTemplateId {
        self.state.id()
    }

    pub fn is_new(&self) -> bool {
        matches!(self.state, EditorState::Unsaved(_))
    }

    /// Загрузка файла шаблона.
    ///
    /// Для нового шаблона это момент создания записи; для сохранённого
    /// файл заменяется. Неподдерживаемое расширение ничего не меняет.
    pub async fn attach_file(&mut self, filename: &str) -> Result<&ReportTemplate, EditorError> {
        let file = TemplateFile::from_filename(filename)?;

        match &self.state {
            EditorState::Unsaved(draft) => {
                let mut template = draft.clone();
                template.attach_file(file);
                template.validate().map_err(EditorError::Validation)?;
                template.before_write();

                self.store.create(&template).await.map_err(|e| {
                    tracing::error!("Failed to create template {}: {}", template.base.id, e);
                    EditorError::Store(e)
                })?;
                template.base.metadata.increment_version();

                tracing::info!(
                    "Created template {} '{}' from {}",
                    template.base.id,
                    template.base.name,
                    filename
                );
                self.state = EditorState::Persisted(template);
            }
            EditorState::Persisted(_) => {
                self.apply("attach_file", |t| {
                    t.attach_file(file);
                    Ok(())
                })
                .await?;
            }
            EditorState::Deleted(id) => return Err(EditorError::Deleted(*id)),
        }

        self.template().ok_or(EditorError::Deleted(self.id()))
    }

    pub async fn set_name(&mut self, name: &str) -> Result<(), EditorError> {
        let name = name.trim().to_string();
        self.apply("set_name", |t| {
            t.set_name(name);
            Ok(())
        })
        .await
    }

    pub async fn set_description(&mut self, description: Option<String>) -> Result<(), EditorError> {
        self.apply("set_description", |t| {
            t.set_description(description);
            Ok(())
        })
        .await
    }

    pub async fn set_group(&mut self, group: Option<String>) -> Result<(), EditorError> {
        self.apply("set_group", |t| {
            t.set_group(group);
            Ok(())
        })
        .await
    }

    /// Добавить источник по ID из каталога
    pub async fn add_binding(&mut self, data_source_id: &str) -> Result<TemplateBinding, EditorError> {
        let catalog = self.catalog;
        let descriptor = *catalog.get(data_source_id)?;
        self.apply("add_binding", |t| {
            Ok(t.add_binding(&descriptor, catalog)?.clone())
        })
        .await
    }

    pub async fn remove_binding(&mut self, index: usize) -> Result<TemplateBinding, EditorError> {
        self.apply("remove_binding", |t| Ok(t.remove_binding(index)?))
            .await
    }

    pub async fn rename_binding_key(&mut self, index: usize, key: &str) -> Result<(), EditorError> {
        let key = key.trim().to_string();
        self.apply("rename_binding_key", |t| Ok(t.rename_binding_key(index, key)?))
            .await
    }

    /// Удаление возможно только для сохранённого шаблона
    pub async fn delete(&mut self) -> Result<(), EditorError> {
        let id = match &self.state {
            EditorState::Persisted(t) => t.base.id,
            EditorState::Unsaved(_) => return Err(EditorError::NotPersisted),
            EditorState::Deleted(id) => return Err(EditorError::Deleted(*id)),
        };

        self.store.delete(&id).await.map_err(|e| {
            tracing::error!("Failed to delete template {}: {}", id, e);
            EditorError::Store(e)
        })?;

        tracing::info!("Deleted template {}", id);
        self.state = EditorState::Deleted(id);
        Ok(())
    }

    /// Выход из режима редактирования
    pub fn finish(self) -> EditorOutcome {
        match self.state {
            EditorState::Unsaved(_) => EditorOutcome::Discarded,
            EditorState::Persisted(t) => EditorOutcome::Saved(t),
            EditorState::Deleted(id) => EditorOutcome::Deleted(id),
        }
    }

    /// Источники, которые сейчас можно добавить, по категориям
    pub fn eligible_sources(&self) -> Result<Vec<DataSourceGroupDto>, EditorError> {
        let template = self.template().ok_or(EditorError::Deleted(self.id()))?;
        let available = self
            .catalog
            .list()
            .iter()
            .filter(|d| template.can_add(d, self.catalog));
        Ok(to_group_dtos(&group(available)))
    }

    /// Применить изменение к копии, сохранить, затем зафиксировать в памяти.
    /// При ошибке состояние редактора не меняется.
    async fn apply<R>(
        &mut self,
        op: &str,
        f: impl FnOnce(&mut ReportTemplate) -> Result<R, EditorError>,
    ) -> Result<R, EditorError> {
        let (mut template, persisted) = match &self.state {
            EditorState::Unsaved(t) => (t.clone(), false),
            EditorState::Persisted(t) => (t.clone(), true),
            EditorState::Deleted(id) => return Err(EditorError::Deleted(*id)),
        };

        let result = f(&mut template)?;

        if !persisted {
            self.state = EditorState::Unsaved(template);
            return Ok(result);
        }

        template.validate().map_err(EditorError::Validation)?;
        template.before_write();

        self.store.update(&template).await.map_err(|e| {
            if e.is::<VersionConflict>() {
                tracing::warn!("Autosave of template {} rejected ({}): {}", template.base.id, op, e);
                return EditorError::Conflict(template.base.id);
            }
            tracing::error!("Autosave of template {} failed ({}): {}", template.base.id, op, e);
            EditorError::Store(e)
        })?;
        template.base.metadata.increment_version();

        tracing::info!("Autosaved template {} after {}", template.base.id, op);
        self.state = EditorState::Persisted(template);
        Ok(result)
    }
}
