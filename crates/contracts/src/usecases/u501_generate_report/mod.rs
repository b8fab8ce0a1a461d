//! Report generation: required inputs, certification and the request
//! handed to the render service.

pub mod builder;
pub mod certification;
pub mod eligibility;
pub mod request;
pub mod response;

pub use builder::{GenerationError, GenerationRequestBuilder};
pub use certification::{CertificationError, CertificationState};
pub use eligibility::{is_satisfied, missing_inputs, required_inputs, CollectedInputs, InputKind};
pub use request::{GenerateReportForm, GenerationRequest, OutputFormat};
pub use response::{GenerationReceipt, LookupOption};
