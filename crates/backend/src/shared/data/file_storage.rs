//! Uploaded template files on disk
//!
//! Files are stored flat as `<templates_dir>/<template id>.<ext>`.
//! Новый файл сначала пишется во временный `<id>.<ext>.<uuid>.part` и
//! переносится на место только после успешной записи шаблона в БД.

use std::path::{Path, PathBuf};

use contracts::domain::a001_report_template::aggregate::ReportTemplateId;
use contracts::domain::a001_report_template::template_file::TemplateFile;
use uuid::Uuid;

use crate::shared::config::{get_config, resolve_path};

pub fn templates_dir() -> PathBuf {
    resolve_path(&get_config().storage.templates_dir)
}

pub fn template_file_path(id: &ReportTemplateId, file: &TemplateFile) -> PathBuf {
    file_path_in(&templates_dir(), id, file)
}

fn file_path_in(dir: &Path, id: &ReportTemplateId, file: &TemplateFile) -> PathBuf {
    dir.join(format!("{}.{}", id, file.kind.extension()))
}

/// Загруженные байты, ещё не ставшие файлом шаблона
#[derive(Debug)]
pub struct StagedFile {
    temp: PathBuf,
    target: PathBuf,
}

impl StagedFile {
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Move the upload into place
    pub async fn commit(self) -> anyhow::Result<PathBuf> {
        if let Err(e) = tokio::fs::rename(&self.temp, &self.target).await {
            tracing::error!(
                "Failed to move {} to {}: {}",
                self.temp.display(),
                self.target.display(),
                e
            );
            remove_quietly(&self.temp).await;
            return Err(e.into());
        }
        tracing::info!("Stored template file {}", self.target.display());
        Ok(self.target)
    }

    /// Drop the upload; the current file stays untouched
    pub async fn discard(self) {
        remove_quietly(&self.temp).await;
    }
}

/// Write the upload next to its final location
pub async fn stage_template_file(
    id: &ReportTemplateId,
    file: &TemplateFile,
    bytes: &[u8],
) -> anyhow::Result<StagedFile> {
    stage_in(&templates_dir(), id, file, bytes).await
}

async fn stage_in(
    dir: &Path,
    id: &ReportTemplateId,
    file: &TemplateFile,
    bytes: &[u8],
) -> anyhow::Result<StagedFile> {
    tokio::fs::create_dir_all(dir).await?;
    let target = file_path_in(dir, id, file);
    let temp = dir.join(format!(
        "{}.{}.{}.part",
        id,
        file.kind.extension(),
        Uuid::new_v4().simple()
    ));
    tokio::fs::write(&temp, bytes).await?;
    tracing::debug!("Staged {} bytes at {}", bytes.len(), temp.display());
    Ok(StagedFile { temp, target })
}

/// Удалить файл шаблона, если он есть
pub async fn remove_template_file(id: &ReportTemplateId, file: &TemplateFile) {
    remove_quietly(&template_file_path(id, file)).await;
}

async fn remove_quietly(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("Failed to remove {}: {}", path.display(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("report-templates-{}", Uuid::new_v4().simple()))
    }

    fn docx(name: &str) -> TemplateFile {
        TemplateFile::from_filename(name).unwrap()
    }

    async fn entries(dir: &Path) -> Vec<String> {
        let mut names = Vec::new();
        let mut read = tokio::fs::read_dir(dir).await.unwrap();
        while let Some(entry) = read.next_entry().await.unwrap() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_commit_replaces_target() {
        let dir = scratch_dir();
        let id = ReportTemplateId::new_v4();
        let file = docx("A.docx");

        stage_in(&dir, &id, &file, b"OLD").await.unwrap().commit().await.unwrap();
        let staged = stage_in(&dir, &id, &file, b"NEW").await.unwrap();
        assert_eq!(tokio::fs::read(staged.target()).await.unwrap(), b"OLD");

        let path = staged.commit().await.unwrap();
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"NEW");
        assert_eq!(entries(&dir).await, vec![format!("{}.docx", id)]);

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_discard_keeps_current_file() {
        let dir = scratch_dir();
        let id = ReportTemplateId::new_v4();
        let file = docx("A.docx");

        stage_in(&dir, &id, &file, b"OLD").await.unwrap().commit().await.unwrap();
        stage_in(&dir, &id, &file, b"NEW").await.unwrap().discard().await;

        assert_eq!(
            tokio::fs::read(file_path_in(&dir, &id, &file)).await.unwrap(),
            b"OLD"
        );
        assert_eq!(entries(&dir).await, vec![format!("{}.docx", id)]);

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
