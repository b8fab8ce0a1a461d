pub mod a001_report_template;
pub mod data_sources;
pub mod error;
pub mod usecases;

pub use error::ApiError;
