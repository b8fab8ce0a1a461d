//! Библиотека документов: папка на каждый шаблон

use std::path::PathBuf;

use async_trait::async_trait;

use super::renderer::RenderedDocument;
use crate::shared::config::{get_config, resolve_path};

#[async_trait]
pub trait DocumentLibrary: Send + Sync {
    /// Сохранить документ в папку шаблона; возвращает путь
    async fn store(&self, template_name: &str, document: &RenderedDocument) -> anyhow::Result<String>;
}

pub struct FsDocumentLibrary {
    root: PathBuf,
}

impl FsDocumentLibrary {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn from_config() -> Self {
        Self::new(resolve_path(&get_config().storage.documents_dir))
    }
}

#[async_trait]
impl DocumentLibrary for FsDocumentLibrary {
    async fn store(&self, template_name: &str, document: &RenderedDocument) -> anyhow::Result<String> {
        let folder = self.root.join(sanitize_name(template_name));
        tokio::fs::create_dir_all(&folder).await?;

        let path = folder.join(sanitize_name(&document.file_name));
        tokio::fs::write(&path, &document.bytes).await?;

        tracing::info!("Saved document to {}", path.display());
        Ok(path.display().to_string())
    }
}

/// Имя, пригодное для файла или папки
pub fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, ' ' | '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim().trim_matches('.').to_string();
    if cleaned.is_empty() {
        "Untitled".to_string()
    } else {
        cleaned
    }
}
