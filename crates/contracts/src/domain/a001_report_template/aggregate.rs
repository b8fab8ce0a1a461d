use super::binding::{BindingError, TemplateBinding};
use super::template_file::{TemplateFile, TemplateFileKind};
use crate::domain::common::{AggregateId, AggregateRoot, BaseAggregate, EntityMetadata};
use crate::shared::data_sources::{DataSourceCatalog, DataSourceDescriptor};
use crate::usecases::u501_generate_report::eligibility::{required_inputs, InputKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// ID типа для агрегата Report Template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportTemplateId(pub Uuid);

impl ReportTemplateId {
    pub fn new(value: Uuid) -> Self {
        Self(value)
    }
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl AggregateId for ReportTemplateId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }
    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(ReportTemplateId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

impl std::fmt::Display for ReportTemplateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Issues
// ============================================================================

/// Замечание к конфигурации шаблона, не блокирующее сохранение
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TemplateIssue {
    /// Пустой ключ привязки
    EmptyKey { index: usize },
    /// Один ключ у нескольких привязок
    DuplicateKey { key: String, indices: Vec<usize> },
    /// Источник отсутствует в каталоге
    UnknownDataSource { index: usize, data_source_id: String },
}

// ============================================================================
// Aggregate
// ============================================================================

/// Агрегат Report Template
///
/// Файл шаблона (docx/xlsx/pptx) плюс упорядоченный список привязок
/// источников данных. Порядок привязок задаёт порядок отображения.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportTemplate {
    #[serde(flatten)]
    pub base: BaseAggregate<ReportTemplateId>,

    /// Группа; None означает без группы
    pub group: Option<String>,
    /// Привязки источников данных
    pub bindings: Vec<TemplateBinding>,
    /// Загруженный файл шаблона
    pub template_file: Option<TemplateFile>,
}

impl ReportTemplate {
    /// Черновик: ещё не сохранён, имя пустое
    pub fn new_draft() -> Self {
        Self::new_for_insert(String::new())
    }

    pub fn new_for_insert(name: String) -> Self {
        Self::new_with_id(ReportTemplateId::new_v4(), name)
    }

    pub fn new_with_id(id: ReportTemplateId, name: String) -> Self {
        Self {
            base: BaseAggregate::new(id, name),
            group: None,
            bindings: vec![],
            template_file: None,
        }
    }

    pub fn to_string_id(&self) -> String {
        self.base.id.as_string()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.base.name = name.into();
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.base.description = non_blank(description);
    }

    pub fn set_group(&mut self, group: Option<String>) {
        self.group = non_blank(group);
    }

    /// Прикрепить файл; пустое имя заполняется именем файла без расширения
    pub fn attach_file(&mut self, file: TemplateFile) {
        if self.base.name.trim().is_empty() {
            self.base.name = file.base_name().to_string();
        }
        self.template_file = Some(file);
    }

    /// Можно ли добавить источник с учётом эксклюзивных категорий
    pub fn can_add(&self, descriptor: &DataSourceDescriptor, catalog: &DataSourceCatalog) -> bool {
        if !descriptor.category.is_exclusive() {
            return true;
        }
        !self.bindings.iter().any(|b| {
            catalog
                .find(&b.data_source_id)
                .is_some_and(|bound| bound.category == descriptor.category)
        })
    }

    pub fn add_binding(
        &mut self,
        descriptor: &DataSourceDescriptor,
        catalog: &DataSourceCatalog,
    ) -> Result<&TemplateBinding, BindingError> {
        if !self.can_add(descriptor, catalog) {
            return Err(BindingError::ConstraintViolation {
                category: descriptor.category,
                data_source_id: descriptor.id.to_string(),
            });
        }
        self.bindings.push(TemplateBinding::for_source(descriptor));
        Ok(&self.bindings[self.bindings.len() - 1])
    }

    pub fn remove_binding(&mut self, index: usize) -> Result<TemplateBinding, BindingError> {
        self.check_index(index)?;
        Ok(self.bindings.remove(index))
    }

    /// Пустой ключ допускается: отсекается на границе API
    pub fn rename_binding_key(
        &mut self,
        index: usize,
        key: impl Into<String>,
    ) -> Result<(), BindingError> {
        self.check_index(index)?;
        self.bindings[index].key = key.into();
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<(), BindingError> {
        if index >= self.bindings.len() {
            return Err(BindingError::IndexOutOfRange {
                index,
                len: self.bindings.len(),
            });
        }
        Ok(())
    }

    /// Шаблон пригоден для генерации: есть файл и хотя бы одна привязка
    pub fn is_usable(&self) -> bool {
        self.template_file.is_some() && !self.bindings.is_empty()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.base.name.trim().is_empty() {
            return Err("Template name cannot be empty".into());
        }
        Ok(())
    }

    /// Нестрогие замечания к привязкам
    pub fn issues(&self, catalog: &DataSourceCatalog) -> Vec<TemplateIssue> {
        let mut issues = Vec::new();
        let mut by_key: BTreeMap<&str, Vec<usize>> = BTreeMap::new();

        for (index, binding) in self.bindings.iter().enumerate() {
            if catalog.find(&binding.data_source_id).is_none() {
                issues.push(TemplateIssue::UnknownDataSource {
                    index,
                    data_source_id: binding.data_source_id.clone(),
                });
            }
            if binding.key.trim().is_empty() {
                issues.push(TemplateIssue::EmptyKey { index });
            } else {
                by_key.entry(binding.key.as_str()).or_default().push(index);
            }
        }

        for (key, indices) in by_key {
            if indices.len() > 1 {
                issues.push(TemplateIssue::DuplicateKey {
                    key: key.to_string(),
                    indices,
                });
            }
        }
        issues
    }

    pub fn before_write(&mut self) {
        self.base.touch();
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl AggregateRoot for ReportTemplate {
    type Id = ReportTemplateId;

    fn id(&self) -> Self::Id {
        self.base.id
    }

    fn name(&self) -> &str {
        &self.base.name
    }

    fn metadata(&self) -> &EntityMetadata {
        &self.base.metadata
    }

    fn metadata_mut(&mut self) -> &mut EntityMetadata {
        &mut self.base.metadata
    }

    fn aggregate_index() -> &'static str {
        "a001"
    }

    fn collection_name() -> &'static str {
        "report_template"
    }

    fn element_name() -> &'static str {
        "Report template"
    }

    fn list_name() -> &'static str {
        "Report templates"
    }
}

// ============================================================================
// DTO для списка
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportTemplateListItem {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub group: Option<String>,
    pub file_name: Option<String>,
    pub file_kind: Option<TemplateFileKind>,
    pub binding_count: usize,
    pub is_usable: bool,
    pub required_inputs: Vec<InputKind>,
    pub updated_at: DateTime<Utc>,
}

impl ReportTemplateListItem {
    pub fn new(template: &ReportTemplate, catalog: &DataSourceCatalog) -> Self {
        Self {
            id: template.to_string_id(),
            name: template.base.name.clone(),
            description: template.base.description.clone(),
            group: template.group.clone(),
            file_name: template.template_file.as_ref().map(|f| f.name.clone()),
            file_kind: template.template_file.as_ref().map(|f| f.kind),
            binding_count: template.bindings.len(),
            is_usable: template.is_usable(),
            required_inputs: required_inputs(template, catalog).into_iter().collect(),
            updated_at: template.base.metadata.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data_sources::DataSourceCategory;

    fn source(id: &str) -> DataSourceDescriptor {
        *DataSourceCatalog::builtin().get(id).unwrap()
    }

    fn template_with(ids: &[&str]) -> ReportTemplate {
        let catalog = DataSourceCatalog::builtin();
        let mut t = ReportTemplate::new_for_insert("XYZ report".into());
        for id in ids {
            t.add_binding(&source(id), &catalog).unwrap();
        }
        t
    }

    #[test]
    fn test_add_binding_derives_key() {
        let t = template_with(&["projects-single-reporting-period", "dt-1"]);
        assert_eq!(
            t.bindings,
            vec![
                TemplateBinding {
                    data_source_id: "projects-single-reporting-period".into(),
                    key: "project".into(),
                },
                TemplateBinding {
                    data_source_id: "dt-1".into(),
                    key: "journalist_trainings".into(),
                },
            ]
        );
    }

    #[test]
    fn test_exclusive_category_rejected() {
        let catalog = DataSourceCatalog::builtin();
        let mut t = template_with(&["projects-single"]);
        let before = t.bindings.clone();

        let err = t
            .add_binding(&source("projects-all"), &catalog)
            .unwrap_err();
        assert_eq!(
            err,
            BindingError::ConstraintViolation {
                category: DataSourceCategory::Projects,
                data_source_id: "projects-all".into(),
            }
        );
        assert_eq!(t.bindings, before);

        // the other exclusive category is independent
        assert!(t.add_binding(&source("indicators-single"), &catalog).is_ok());
        assert!(!t.can_add(&source("indicators-all"), &catalog));
    }

    #[test]
    fn test_non_exclusive_categories_repeat() {
        let catalog = DataSourceCatalog::builtin();
        let mut t = template_with(&["dt-1", "dt-2", "sr-1"]);
        assert!(t.add_binding(&source("dt-1"), &catalog).is_ok());
        assert_eq!(t.bindings.len(), 4);
    }

    #[test]
    fn test_remove_restores_bindings() {
        let catalog = DataSourceCatalog::builtin();
        let mut t = template_with(&["indicators-all", "dt-2"]);
        let original = t.bindings.clone();

        t.add_binding(&source("sr-1"), &catalog).unwrap();
        let removed = t.remove_binding(original.len()).unwrap();
        assert_eq!(removed.data_source_id, "sr-1");
        assert_eq!(t.bindings, original);
    }

    #[test]
    fn test_removal_frees_exclusive_slot() {
        let catalog = DataSourceCatalog::builtin();
        let mut t = template_with(&["projects-single"]);
        t.remove_binding(0).unwrap();
        assert!(t.can_add(&source("projects-all"), &catalog));
    }

    #[test]
    fn test_index_out_of_range() {
        let mut t = template_with(&["dt-1"]);
        assert_eq!(
            t.remove_binding(1).unwrap_err(),
            BindingError::IndexOutOfRange { index: 1, len: 1 }
        );
        assert_eq!(
            t.rename_binding_key(5, "x").unwrap_err(),
            BindingError::IndexOutOfRange { index: 5, len: 1 }
        );
        assert_eq!(t.bindings.len(), 1);
    }

    #[test]
    fn test_rename_key() {
        let mut t = template_with(&["dt-1"]);
        t.rename_binding_key(0, "trainings").unwrap();
        assert_eq!(t.bindings[0].key, "trainings");

        t.rename_binding_key(0, "").unwrap();
        assert_eq!(t.issues(&DataSourceCatalog::builtin()), vec![TemplateIssue::EmptyKey { index: 0 }]);
    }

    #[test]
    fn test_is_usable() {
        let mut t = ReportTemplate::new_draft();
        assert!(!t.is_usable());

        t.attach_file(TemplateFile::from_filename("Quarterly.docx").unwrap());
        assert!(!t.is_usable());

        t.add_binding(&source("dt-1"), &DataSourceCatalog::builtin())
            .unwrap();
        assert!(t.is_usable());
    }

    #[test]
    fn test_attach_file_names_blank_template() {
        let mut t = ReportTemplate::new_draft();
        t.attach_file(TemplateFile::from_filename("Quarterly.docx").unwrap());
        assert_eq!(t.base.name, "Quarterly");

        t.attach_file(TemplateFile::from_filename("Other.xlsx").unwrap());
        assert_eq!(t.base.name, "Quarterly");
        assert_eq!(t.template_file.as_ref().unwrap().name, "Other.xlsx");
    }

    #[test]
    fn test_blank_description_and_group_are_none() {
        let mut t = ReportTemplate::new_draft();
        t.set_description(Some("  ".into()));
        t.set_group(Some("".into()));
        assert_eq!(t.base.description, None);
        assert_eq!(t.group, None);

        t.set_group(Some("Donor reports".into()));
        assert_eq!(t.group.as_deref(), Some("Donor reports"));
    }

    #[test]
    fn test_validate_name() {
        assert!(ReportTemplate::new_draft().validate().is_err());
        assert!(template_with(&[]).validate().is_ok());
    }

    #[test]
    fn test_issues_report_duplicates_and_unknown_sources() {
        let catalog = DataSourceCatalog::builtin();
        let mut t = template_with(&["projects-single", "dt-1", "dt-2"]);
        t.rename_binding_key(2, "journalist_trainings").unwrap();
        t.bindings.push(TemplateBinding {
            data_source_id: "retired-source".into(),
            key: "legacy".into(),
        });

        let issues = t.issues(&catalog);
        assert_eq!(
            issues,
            vec![
                TemplateIssue::UnknownDataSource {
                    index: 3,
                    data_source_id: "retired-source".into(),
                },
                TemplateIssue::DuplicateKey {
                    key: "journalist_trainings".into(),
                    indices: vec![1, 2],
                },
            ]
        );
    }

    #[test]
    fn test_list_item() {
        let mut t = template_with(&["projects-single-reporting-period"]);
        t.attach_file(TemplateFile::from_filename("XYZ template.docx").unwrap());

        let item = ReportTemplateListItem::new(&t, &DataSourceCatalog::builtin());
        assert!(item.is_usable);
        assert_eq!(item.file_kind, Some(TemplateFileKind::Word));
        assert_eq!(
            item.required_inputs,
            vec![InputKind::Project, InputKind::ReportingPeriod]
        );
    }

    #[test]
    fn test_aggregate_table_name() {
        assert_eq!(ReportTemplate::full_name(), "a001_report_template");
    }
}
