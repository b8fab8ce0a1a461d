//! Registry of bindable data sources

use std::collections::{BTreeMap, HashSet};

use thiserror::Error;

use super::types::{DataSourceCategory, DataSourceDescriptor, DataSourceGroupDto, DataSourceKind};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("Unknown data source: {0}")]
    NotFound(String),

    #[error("Duplicate data source id in catalog: {0}")]
    DuplicateId(String),
}

/// Data sources shipped with the application
pub const BUILTIN_DATA_SOURCES: &[DataSourceDescriptor] = &[
    // Projects
    DataSourceDescriptor {
        id: "projects-all",
        category: DataSourceCategory::Projects,
        kind: DataSourceKind::AllProjects,
        label: "All projects",
        default_key: Some("projects"),
    },
    DataSourceDescriptor {
        id: "projects-single",
        category: DataSourceCategory::Projects,
        kind: DataSourceKind::SingleProject,
        label: "Single project",
        default_key: Some("project"),
    },
    DataSourceDescriptor {
        id: "projects-single-reporting-period",
        category: DataSourceCategory::Projects,
        kind: DataSourceKind::SingleProjectReportingPeriod,
        label: "Single project, single reporting period",
        default_key: Some("project"),
    },
    // Indicators
    DataSourceDescriptor {
        id: "indicators-all",
        category: DataSourceCategory::Indicators,
        kind: DataSourceKind::AllIndicators,
        label: "All indicators",
        default_key: Some("indicators"),
    },
    DataSourceDescriptor {
        id: "indicators-single",
        category: DataSourceCategory::Indicators,
        kind: DataSourceKind::SingleIndicator,
        label: "Single indicator",
        default_key: Some("indicator"),
    },
    // Data tables
    DataSourceDescriptor {
        id: "dt-1",
        category: DataSourceCategory::DataTables,
        kind: DataSourceKind::DataTable,
        label: "Journalist trainings",
        default_key: None,
    },
    DataSourceDescriptor {
        id: "dt-2",
        category: DataSourceCategory::DataTables,
        kind: DataSourceKind::DataTable,
        label: "Vaccinations",
        default_key: None,
    },
    // Saved reports
    DataSourceDescriptor {
        id: "sr-1",
        category: DataSourceCategory::SavedReports,
        kind: DataSourceKind::SavedReport,
        label: "Trainings by quarter",
        default_key: None,
    },
];

/// Read-only catalog of data source descriptors
#[derive(Debug, Clone)]
pub struct DataSourceCatalog {
    entries: Vec<DataSourceDescriptor>,
}

impl DataSourceCatalog {
    /// Build a catalog, rejecting duplicate ids
    pub fn new(entries: Vec<DataSourceDescriptor>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for entry in &entries {
            if !seen.insert(entry.id) {
                return Err(CatalogError::DuplicateId(entry.id.to_string()));
            }
        }
        Ok(Self { entries })
    }

    /// Catalog with the built-in data sources
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN_DATA_SOURCES.to_vec(),
        }
    }

    /// All descriptors in catalog order
    pub fn list(&self) -> &[DataSourceDescriptor] {
        &self.entries
    }

    pub fn find(&self, id: &str) -> Option<&DataSourceDescriptor> {
        self.entries.iter().find(|d| d.id == id)
    }

    pub fn get(&self, id: &str) -> Result<&DataSourceDescriptor, CatalogError> {
        self.find(id)
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    /// Descriptors grouped by category; categories without entries are absent
    pub fn group_by_category(&self) -> BTreeMap<DataSourceCategory, Vec<&DataSourceDescriptor>> {
        group(self.entries.iter())
    }
}

impl Default for DataSourceCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Group descriptors by category, keeping their relative order
pub fn group<'a>(
    descriptors: impl IntoIterator<Item = &'a DataSourceDescriptor>,
) -> BTreeMap<DataSourceCategory, Vec<&'a DataSourceDescriptor>> {
    let mut groups: BTreeMap<DataSourceCategory, Vec<&'a DataSourceDescriptor>> = BTreeMap::new();
    for d in descriptors {
        groups.entry(d.category).or_default().push(d);
    }
    groups
}

/// Convert grouped descriptors into API DTOs
pub fn to_group_dtos(
    groups: &BTreeMap<DataSourceCategory, Vec<&DataSourceDescriptor>>,
) -> Vec<DataSourceGroupDto> {
    groups
        .iter()
        .filter(|(_, sources)| !sources.is_empty())
        .map(|(category, sources)| DataSourceGroupDto::new(*category, sources))
        .collect()
}

/// Global catalog instance
static CATALOG: std::sync::OnceLock<DataSourceCatalog> = std::sync::OnceLock::new();

/// Get global data source catalog
pub fn get_catalog() -> &'static DataSourceCatalog {
    CATALOG.get_or_init(DataSourceCatalog::builtin)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_ids_are_unique() {
        assert!(DataSourceCatalog::new(BUILTIN_DATA_SOURCES.to_vec()).is_ok());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut entries = BUILTIN_DATA_SOURCES.to_vec();
        entries.push(BUILTIN_DATA_SOURCES[0]);
        let err = DataSourceCatalog::new(entries).unwrap_err();
        assert_eq!(err, CatalogError::DuplicateId("projects-all".to_string()));
    }

    #[test]
    fn test_get_known_and_unknown() {
        let catalog = DataSourceCatalog::builtin();
        let d = catalog.get("indicators-single").unwrap();
        assert_eq!(d.kind, DataSourceKind::SingleIndicator);
        assert_eq!(d.default_key, Some("indicator"));

        assert_eq!(
            catalog.get("nope").unwrap_err(),
            CatalogError::NotFound("nope".to_string())
        );
    }

    #[test]
    fn test_group_by_category_order() {
        let catalog = DataSourceCatalog::builtin();
        let groups = catalog.group_by_category();

        let categories: Vec<_> = groups.keys().copied().collect();
        assert_eq!(categories, DataSourceCategory::all().to_vec());
        assert_eq!(groups[&DataSourceCategory::Projects].len(), 3);
        assert_eq!(groups[&DataSourceCategory::DataTables][1].id, "dt-2");
    }

    #[test]
    fn test_group_suppresses_empty_categories() {
        let catalog = DataSourceCatalog::builtin();
        let only_tables = catalog
            .list()
            .iter()
            .filter(|d| d.category == DataSourceCategory::DataTables);
        let groups = group(only_tables);
        assert_eq!(groups.len(), 1);

        let dtos = to_group_dtos(&groups);
        assert_eq!(dtos.len(), 1);
        assert_eq!(dtos[0].title, "Data tables");
        assert_eq!(dtos[0].sources.len(), 2);
    }
}
