pub mod documents;
pub mod executor;
pub mod lookups;
pub mod renderer;

pub use executor::{GenerateError, ReportGenerator};
