use super::editor::{EditorError, EditorOutcome, TemplateEditor};
use super::store::TemplateStore;
use crate::shared::data::file_storage;
use contracts::domain::a001_report_template::aggregate::{
    ReportTemplate, ReportTemplateId, ReportTemplateListItem, TemplateIssue,
};
use contracts::domain::a001_report_template::binding::TemplateBinding;
use contracts::domain::a001_report_template::template_file::TemplateFile;
use contracts::domain::common::AggregateId;
use contracts::shared::data_sources::{get_catalog, DataSourceGroupDto};
use contracts::usecases::u501_generate_report::{required_inputs, InputKind};
use serde::{Deserialize, Deserializer, Serialize};

/// Загруженный файл шаблона
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Поля шаблона. Отсутствующее поле не меняется, `null` очищает
/// описание или группу.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateFieldsDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub group: Option<Option<String>>,
}

/// Поле присутствует в JSON, возможно со значением null
fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddBindingDto {
    pub data_source_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameKeyDto {
    pub key: String,
}

/// Карточка шаблона для формы редактирования
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportTemplateDetails {
    pub template: ReportTemplate,
    pub is_usable: bool,
    pub required_inputs: Vec<InputKind>,
    pub issues: Vec<TemplateIssue>,
    pub eligible_sources: Vec<DataSourceGroupDto>,
}

pub fn parse_id(id: &str) -> anyhow::Result<ReportTemplateId> {
    ReportTemplateId::from_string(id)
        .map_err(|_| EditorError::NotFound(id.to_string()).into())
}

async fn open<'a>(store: &'a dyn TemplateStore, id: &str) -> anyhow::Result<TemplateEditor<'a>> {
    let id = parse_id(id)?;
    Ok(TemplateEditor::open(store, get_catalog(), &id).await?)
}

fn saved(editor: TemplateEditor<'_>) -> anyhow::Result<ReportTemplate> {
    match editor.finish() {
        EditorOutcome::Saved(template) => Ok(template),
        EditorOutcome::Discarded => Err(EditorError::NotPersisted.into()),
        EditorOutcome::Deleted(id) => Err(EditorError::Deleted(id).into()),
    }
}

/// Список шаблонов
pub async fn list_all(store: &dyn TemplateStore) -> anyhow::Result<Vec<ReportTemplateListItem>> {
    let catalog = get_catalog();
    let mut items: Vec<ReportTemplateListItem> = store
        .list()
        .await?
        .iter()
        .map(|t| ReportTemplateListItem::new(t, catalog))
        .collect();
    items.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    Ok(items)
}

pub async fn get(store: &dyn TemplateStore, id: &str) -> anyhow::Result<ReportTemplate> {
    let editor = open(store, id).await?;
    saved(editor)
}

pub async fn get_details(store: &dyn TemplateStore, id: &str) -> anyhow::Result<ReportTemplateDetails> {
    let editor = open(store, id).await?;
    let eligible_sources = editor.eligible_sources()?;
    let template = saved(editor)?;
    let catalog = get_catalog();

    Ok(ReportTemplateDetails {
        is_usable: template.is_usable(),
        required_inputs: required_inputs(&template, catalog).into_iter().collect(),
        issues: template.issues(catalog),
        eligible_sources,
        template,
    })
}

/// Создание шаблона загрузкой файла
///
/// Тип проверяется до записи байтов. Файл встаёт на место только после
/// успешной записи в БД; при ошибке на диске ничего не остаётся.
pub async fn create_from_upload(
    store: &dyn TemplateStore,
    upload: UploadedFile,
    fields: TemplateFieldsDto,
) -> anyhow::Result<ReportTemplate> {
    let file = TemplateFile::from_filename(&upload.filename).map_err(EditorError::from)?;

    let mut editor = TemplateEditor::create(store, get_catalog());
    if let Some(name) = fields.name.as_deref() {
        editor.set_name(name).await?;
    }
    if let Some(description) = fields.description {
        editor.set_description(description).await?;
    }
    if let Some(group) = fields.group {
        editor.set_group(group).await?;
    }

    attach_upload(&mut editor, &file, &upload).await?;
    saved(editor)
}

/// Замена файла существующего шаблона
///
/// При ошибке записи остаются и прежняя запись, и прежний файл.
pub async fn replace_file(
    store: &dyn TemplateStore,
    id: &str,
    upload: UploadedFile,
) -> anyhow::Result<ReportTemplate> {
    let file = TemplateFile::from_filename(&upload.filename).map_err(EditorError::from)?;
    let mut editor = open(store, id).await?;
    let previous = editor.template().and_then(|t| t.template_file.clone());

    attach_upload(&mut editor, &file, &upload).await?;

    if let Some(previous) = previous {
        if previous.kind != file.kind {
            file_storage::remove_template_file(&editor.id(), &previous).await;
        }
    }
    saved(editor)
}

async fn attach_upload(
    editor: &mut TemplateEditor<'_>,
    file: &TemplateFile,
    upload: &UploadedFile,
) -> anyhow::Result<()> {
    let staged = file_storage::stage_template_file(&editor.id(), file, &upload.bytes).await?;
    if let Err(e) = editor.attach_file(&upload.filename).await {
        staged.discard().await;
        return Err(e.into());
    }
    staged.commit().await?;
    Ok(())
}

/// Обновить имя, описание и группу; сохраняются только переданные и
/// изменённые поля
pub async fn update_fields(
    store: &dyn TemplateStore,
    id: &str,
    dto: TemplateFieldsDto,
) -> anyhow::Result<ReportTemplate> {
    let mut editor = open(store, id).await?;
    let current = editor
        .template()
        .cloned()
        .ok_or(EditorError::NotPersisted)?;

    if let Some(name) = dto.name.as_deref() {
        if name.trim() != current.base.name {
            editor.set_name(name).await?;
        }
    }
    if let Some(description) = dto.description {
        if normalized(&description) != current.base.description {
            editor.set_description(description).await?;
        }
    }
    if let Some(group) = dto.group {
        if normalized(&group) != current.group {
            editor.set_group(group).await?;
        }
    }

    saved(editor)
}

fn normalized(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.trim().is_empty())
}

pub async fn add_binding(
    store: &dyn TemplateStore,
    id: &str,
    dto: AddBindingDto,
) -> anyhow::Result<TemplateBinding> {
    let mut editor = open(store, id).await?;
    Ok(editor.add_binding(&dto.data_source_id).await?)
}

pub async fn remove_binding(
    store: &dyn TemplateStore,
    id: &str,
    index: usize,
) -> anyhow::Result<TemplateBinding> {
    let mut editor = open(store, id).await?;
    Ok(editor.remove_binding(index).await?)
}

/// Пустой ключ через API не принимается
pub async fn rename_binding_key(
    store: &dyn TemplateStore,
    id: &str,
    index: usize,
    dto: RenameKeyDto,
) -> anyhow::Result<ReportTemplate> {
    if dto.key.trim().is_empty() {
        return Err(EditorError::Validation("Binding key cannot be empty".into()).into());
    }
    let mut editor = open(store, id).await?;
    editor.rename_binding_key(index, &dto.key).await?;
    saved(editor)
}

pub async fn delete(store: &dyn TemplateStore, id: &str) -> anyhow::Result<()> {
    let mut editor = open(store, id).await?;
    editor.delete().await?;
    Ok(())
}

pub async fn eligible_sources(
    store: &dyn TemplateStore,
    id: &str,
) -> anyhow::Result<Vec<DataSourceGroupDto>> {
    let editor = open(store, id).await?;
    Ok(editor.eligible_sources()?)
}

pub async fn required_inputs_of(
    store: &dyn TemplateStore,
    id: &str,
) -> anyhow::Result<Vec<InputKind>> {
    let template = get(store, id).await?;
    Ok(required_inputs(&template, get_catalog()).into_iter().collect())
}

/// Вставка тестовых данных
pub async fn insert_test_data(store: &dyn TemplateStore) -> anyhow::Result<()> {
    let data: [(&str, &str, &[(&str, &str)]); 5] = [
        (
            "XYZ report",
            "XYZ template.docx",
            &[
                ("projects-single-reporting-period", "project"),
                ("dt-1", "trainings"),
            ],
        ),
        (
            "QRS report",
            "QRS template.docx",
            &[("projects-single", "project")],
        ),
        (
            "Indicator information report",
            "Indicator information report.docx",
            &[("indicators-single", "indicator")],
        ),
        (
            "Indicator list",
            "Indicator list.docx",
            &[("indicators-all", "indicators")],
        ),
        (
            "Project list",
            "Project list.docx",
            &[("projects-all", "projects")],
        ),
    ];

    let catalog = get_catalog();
    for (name, filename, bindings) in data {
        let mut editor = TemplateEditor::create(store, catalog);
        editor.set_name(name).await?;
        editor.attach_file(filename).await?;
        for (index, (data_source_id, key)) in bindings.iter().enumerate() {
            let binding = editor.add_binding(data_source_id).await?;
            if binding.key != *key {
                editor.rename_binding_key(index, key).await?;
            }
        }
        tracing::info!("Inserted test template '{}'", name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a001_report_template::store::memory::InMemoryTemplateStore;
    use contracts::domain::a001_report_template::binding::BindingError;

    async fn seeded() -> InMemoryTemplateStore {
        let store = InMemoryTemplateStore::new();
        insert_test_data(&store).await.unwrap();
        store
    }

    async fn id_of(store: &InMemoryTemplateStore, name: &str) -> String {
        list_all(store)
            .await
            .unwrap()
            .into_iter()
            .find(|i| i.name == name)
            .map(|i| i.id)
            .unwrap()
    }

    #[tokio::test]
    async fn test_seed_data() {
        let store = seeded().await;
        let items = list_all(&store).await.unwrap();
        assert_eq!(items.len(), 5);
        assert!(items.iter().all(|i| i.is_usable));

        let xyz = items.iter().find(|i| i.name == "XYZ report").unwrap();
        assert_eq!(
            xyz.required_inputs,
            vec![InputKind::Project, InputKind::ReportingPeriod]
        );

        let template = get(&store, &xyz.id).await.unwrap();
        assert_eq!(template.bindings[1].key, "trainings");
    }

    #[tokio::test]
    async fn test_details() {
        let store = seeded().await;
        let id = id_of(&store, "QRS report").await;

        let details = get_details(&store, &id).await.unwrap();
        assert_eq!(details.required_inputs, vec![InputKind::Project]);
        assert!(details.issues.is_empty());
        assert!(details
            .eligible_sources
            .iter()
            .all(|g| !g.category.is_exclusive() || g.category.as_str() == "indicators"));
    }

    #[tokio::test]
    async fn test_update_fields_only_writes_changes() {
        let store = seeded().await;
        let id = id_of(&store, "Project list").await;
        let writes = store.writes().len();

        let dto = TemplateFieldsDto {
            name: Some("Project list".into()),
            description: None,
            group: Some(Some("Donor reports".into())),
        };
        let template = update_fields(&store, &id, dto).await.unwrap();
        assert_eq!(template.group.as_deref(), Some("Donor reports"));
        assert_eq!(store.writes().len(), writes + 1);
    }

    #[tokio::test]
    async fn test_update_fields_absent_keeps_null_clears() {
        let store = seeded().await;
        let id = id_of(&store, "QRS report").await;
        let dto: TemplateFieldsDto =
            serde_json::from_str(r#"{"description": "Monthly", "group": "Donor reports"}"#).unwrap();
        update_fields(&store, &id, dto).await.unwrap();

        let dto: TemplateFieldsDto = serde_json::from_str(r#"{"name": "QRS"}"#).unwrap();
        assert_eq!(dto.description, None);
        let template = update_fields(&store, &id, dto).await.unwrap();
        assert_eq!(template.base.name, "QRS");
        assert_eq!(template.base.description.as_deref(), Some("Monthly"));
        assert_eq!(template.group.as_deref(), Some("Donor reports"));

        let dto: TemplateFieldsDto = serde_json::from_str(r#"{"group": null}"#).unwrap();
        assert_eq!(dto.group, Some(None));
        let template = update_fields(&store, &id, dto).await.unwrap();
        assert_eq!(template.group, None);
        assert_eq!(template.base.description.as_deref(), Some("Monthly"));
    }

    fn upload(filename: &str, bytes: &[u8]) -> UploadedFile {
        UploadedFile {
            filename: filename.into(),
            bytes: bytes.to_vec(),
        }
    }

    /// Files in the templates directory that belong to `id`, temp files included
    async fn files_of(id: &ReportTemplateId) -> Vec<String> {
        let prefix = id.to_string();
        let mut names = Vec::new();
        let Ok(mut read) = tokio::fs::read_dir(file_storage::templates_dir()).await else {
            return names;
        };
        while let Some(entry) = read.next_entry().await.unwrap() {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with(&prefix) {
                names.push(name);
            }
        }
        names.sort();
        names
    }

    async fn remove_files_of(id: &ReportTemplateId) {
        for name in files_of(id).await {
            let _ = tokio::fs::remove_file(file_storage::templates_dir().join(name)).await;
        }
    }

    #[tokio::test]
    async fn test_failed_replace_keeps_file_and_record() {
        let store = InMemoryTemplateStore::new();
        let created = create_from_upload(&store, upload("A.docx", b"OLD"), TemplateFieldsDto::default())
            .await
            .unwrap();
        let id = created.base.id;
        let old_file = created.template_file.clone().unwrap();

        store.fail_writes(true);
        let err = replace_file(&store, &id.as_string(), upload("B.docx", b"NEW"))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EditorError>(),
            Some(EditorError::Store(_))
        ));

        assert_eq!(store.snapshot(&id).unwrap().template_file, Some(old_file.clone()));
        let on_disk = tokio::fs::read(file_storage::template_file_path(&id, &old_file))
            .await
            .unwrap();
        assert_eq!(on_disk, b"OLD");
        assert_eq!(files_of(&id).await, vec![format!("{}.docx", id)]);

        remove_files_of(&id).await;
    }

    #[tokio::test]
    async fn test_failed_create_leaves_no_file() {
        let store = InMemoryTemplateStore::new();
        store.fail_writes(true);
        let marker = uuid::Uuid::new_v4().to_string().into_bytes();

        assert!(
            create_from_upload(&store, upload("A.docx", &marker), TemplateFieldsDto::default())
                .await
                .is_err()
        );
        assert!(store.list().await.unwrap().is_empty());

        if let Ok(mut read) = tokio::fs::read_dir(file_storage::templates_dir()).await {
            while let Some(entry) = read.next_entry().await.unwrap() {
                let bytes = tokio::fs::read(entry.path()).await.unwrap_or_default();
                assert_ne!(bytes, marker, "leftover {}", entry.path().display());
            }
        }
    }

    #[tokio::test]
    async fn test_replace_with_other_kind_removes_old_file() {
        let store = InMemoryTemplateStore::new();
        let created = create_from_upload(&store, upload("A.docx", b"OLD"), TemplateFieldsDto::default())
            .await
            .unwrap();
        let id = created.base.id;

        let replaced = replace_file(&store, &id.as_string(), upload("B.xlsx", b"NEW"))
            .await
            .unwrap();
        let new_file = replaced.template_file.clone().unwrap();
        assert_eq!(new_file.name, "B.xlsx");
        assert_eq!(files_of(&id).await, vec![format!("{}.xlsx", id)]);
        let on_disk = tokio::fs::read(file_storage::template_file_path(&id, &new_file))
            .await
            .unwrap();
        assert_eq!(on_disk, b"NEW");

        remove_files_of(&id).await;
    }

    #[tokio::test]
    async fn test_blank_key_rejected_at_boundary() {
        let store = seeded().await;
        let id = id_of(&store, "Indicator list").await;

        let err = rename_binding_key(&store, &id, 0, RenameKeyDto { key: " ".into() })
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EditorError>(),
            Some(EditorError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_binding_errors_surface() {
        let store = seeded().await;
        let id = id_of(&store, "QRS report").await;

        let err = add_binding(&store, &id, AddBindingDto { data_source_id: "projects-all".into() })
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EditorError>(),
            Some(EditorError::Binding(BindingError::ConstraintViolation { .. }))
        ));

        let err = remove_binding(&store, &id, 7).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EditorError>(),
            Some(EditorError::Binding(BindingError::IndexOutOfRange { .. }))
        ));
    }

    #[tokio::test]
    async fn test_delete_and_missing() {
        let store = seeded().await;
        let id = id_of(&store, "Indicator information report").await;

        delete(&store, &id).await.unwrap();
        assert_eq!(list_all(&store).await.unwrap().len(), 4);

        let err = get(&store, &id).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EditorError>(),
            Some(EditorError::NotFound(_))
        ));
        assert!(get(&store, "not-a-uuid").await.is_err());
    }
}
