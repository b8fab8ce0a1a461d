use serde::{Deserialize, Serialize};

/// Category of a bindable data source
///
/// Variant order is the display order of the binding picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSourceCategory {
    Projects,
    Indicators,
    DataTables,
    SavedReports,
}

impl DataSourceCategory {
    pub fn all() -> [DataSourceCategory; 4] {
        [
            DataSourceCategory::Projects,
            DataSourceCategory::Indicators,
            DataSourceCategory::DataTables,
            DataSourceCategory::SavedReports,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DataSourceCategory::Projects => "projects",
            DataSourceCategory::Indicators => "indicators",
            DataSourceCategory::DataTables => "data_tables",
            DataSourceCategory::SavedReports => "saved_reports",
        }
    }

    /// Human-readable name shown as the picker group header
    pub fn display_name(&self) -> &'static str {
        match self {
            DataSourceCategory::Projects => "Projects",
            DataSourceCategory::Indicators => "Indicators",
            DataSourceCategory::DataTables => "Data tables",
            DataSourceCategory::SavedReports => "Saved reports",
        }
    }

    /// A template may hold at most one binding from an exclusive category
    pub fn is_exclusive(&self) -> bool {
        matches!(
            self,
            DataSourceCategory::Projects | DataSourceCategory::Indicators
        )
    }
}

impl std::fmt::Display for DataSourceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// What a data source delivers to the rendered document
///
/// Required generation inputs are derived from the kind, never from the
/// raw catalog id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSourceKind {
    AllProjects,
    SingleProject,
    SingleProjectReportingPeriod,
    AllIndicators,
    SingleIndicator,
    DataTable,
    SavedReport,
}

/// Catalog entry (static version)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataSourceDescriptor {
    /// Unique identifier (e.g., "projects-single")
    pub id: &'static str,
    pub category: DataSourceCategory,
    pub kind: DataSourceKind,
    /// Human-readable name (e.g., "Single project")
    pub label: &'static str,
    /// Suggested binding key
    pub default_key: Option<&'static str>,
}

/// Owned version of DataSourceDescriptor for API responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSourceInfo {
    pub id: String,
    pub category: DataSourceCategory,
    pub kind: DataSourceKind,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_key: Option<String>,
}

impl From<&DataSourceDescriptor> for DataSourceInfo {
    fn from(d: &DataSourceDescriptor) -> Self {
        Self {
            id: d.id.to_string(),
            category: d.category,
            kind: d.kind,
            label: d.label.to_string(),
            default_key: d.default_key.map(|k| k.to_string()),
        }
    }
}

/// One non-empty category group of the binding picker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSourceGroupDto {
    pub category: DataSourceCategory,
    pub title: String,
    pub sources: Vec<DataSourceInfo>,
}

impl DataSourceGroupDto {
    pub fn new(category: DataSourceCategory, sources: &[&DataSourceDescriptor]) -> Self {
        Self {
            category,
            title: category.display_name().to_string(),
            sources: sources.iter().map(|d| DataSourceInfo::from(*d)).collect(),
        }
    }
}
