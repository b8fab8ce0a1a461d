//! Generation request builder
//!
//! Holds the state of one "Generate" dialog: required inputs derived from
//! the template, the user's selections, output options and certification.

use std::collections::BTreeSet;

use thiserror::Error;

use super::certification::{CertificationError, CertificationState};
use super::eligibility::{is_satisfied, missing_inputs, required_inputs, CollectedInputs, InputKind};
use super::request::{GenerateReportForm, GenerationRequest, OutputFormat};
use crate::domain::a001_report_template::aggregate::ReportTemplate;
use crate::shared::data_sources::DataSourceCatalog;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("Template needs a file and at least one data source before it can be generated")]
    TemplateNotUsable,

    #[error("Missing required inputs: {}", format_kinds(.0))]
    MissingInputs(Vec<InputKind>),

    #[error("Certification requested but not confirmed")]
    CertificationPending,

    #[error(transparent)]
    Certification(#[from] CertificationError),
}

fn format_kinds(kinds: &[InputKind]) -> String {
    kinds
        .iter()
        .map(InputKind::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone)]
pub struct GenerationRequestBuilder {
    template_id: String,
    required: BTreeSet<InputKind>,
    collected: CollectedInputs,
    output_format: OutputFormat,
    save_to_documents: bool,
    certification: CertificationState,
}

impl GenerationRequestBuilder {
    /// Generation is only offered for usable templates
    pub fn new(template: &ReportTemplate, catalog: &DataSourceCatalog) -> Result<Self, GenerationError> {
        if !template.is_usable() {
            return Err(GenerationError::TemplateNotUsable);
        }
        Ok(Self {
            template_id: template.to_string_id(),
            required: required_inputs(template, catalog),
            collected: CollectedInputs::new(),
            output_format: OutputFormat::default(),
            save_to_documents: false,
            certification: CertificationState::default(),
        })
    }

    /// Replay a submitted dialog form
    pub fn from_form(
        template: &ReportTemplate,
        catalog: &DataSourceCatalog,
        form: GenerateReportForm,
    ) -> Result<Self, GenerationError> {
        let mut builder = Self::new(template, catalog)?;
        builder.collected = form.collected;
        builder.output_format = form.output_format;
        builder.save_to_documents = form.save_to_documents;
        builder.set_certify(form.certify);
        if form.certify && form.certification_confirmed {
            builder.confirm_certification()?;
        }
        Ok(builder)
    }

    pub fn required_inputs(&self) -> &BTreeSet<InputKind> {
        &self.required
    }

    pub fn collected(&self) -> &CollectedInputs {
        &self.collected
    }

    pub fn select(&mut self, kind: InputKind, id: impl Into<String>) {
        self.collected.set(kind, id);
    }

    pub fn clear(&mut self, kind: InputKind) {
        self.collected.clear(kind);
    }

    pub fn set_output_format(&mut self, format: OutputFormat) {
        self.output_format = format;
    }

    pub fn set_save_to_documents(&mut self, save: bool) {
        self.save_to_documents = save;
    }

    pub fn set_certify(&mut self, on: bool) {
        self.certification.set_requested(on);
    }

    pub fn confirm_certification(&mut self) -> Result<(), CertificationError> {
        self.certification.confirm()
    }

    pub fn certification(&self) -> CertificationState {
        self.certification
    }

    pub fn missing_inputs(&self) -> Vec<InputKind> {
        missing_inputs(&self.required, &self.collected)
    }

    /// Whether the "Generate" action is enabled
    pub fn is_valid(&self) -> bool {
        is_satisfied(&self.required, &self.collected) && self.certification.is_settled()
    }

    pub fn build(&self) -> Result<GenerationRequest, GenerationError> {
        let missing = self.missing_inputs();
        if !missing.is_empty() {
            return Err(GenerationError::MissingInputs(missing));
        }
        if !self.certification.is_settled() {
            return Err(GenerationError::CertificationPending);
        }

        let pick = |kind: InputKind| {
            if self.required.contains(&kind) {
                self.collected.get(kind).map(str::to_string)
            } else {
                None
            }
        };

        Ok(GenerationRequest {
            template_id: self.template_id.clone(),
            project_id: pick(InputKind::Project),
            reporting_period_id: pick(InputKind::ReportingPeriod),
            indicator_id: pick(InputKind::Indicator),
            output_format: self.output_format,
            save_to_documents: self.save_to_documents,
            certified: self.certification.is_certified(),
        })
    }
}
