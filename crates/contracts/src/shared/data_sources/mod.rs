//! Data source catalog
//!
//! Static registry of the data source kinds a report template can bind.
//! The catalog is the only place that maps a data source id to its
//! category and kind.

pub mod catalog;
pub mod types;

pub use catalog::{get_catalog, CatalogError, DataSourceCatalog, BUILTIN_DATA_SOURCES};
pub use types::{
    DataSourceCategory, DataSourceDescriptor, DataSourceGroupDto, DataSourceInfo, DataSourceKind,
};
