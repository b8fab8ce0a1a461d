//! Common types for all UseCases

pub mod usecase_result;

pub use usecase_result::{ErrorCode, UseCaseError};
