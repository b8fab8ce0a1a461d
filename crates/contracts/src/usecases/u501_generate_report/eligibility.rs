//! Which inputs must be collected before a template can be generated

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::domain::a001_report_template::aggregate::ReportTemplate;
use crate::domain::a001_report_template::binding::TemplateBinding;
use crate::shared::data_sources::{DataSourceCatalog, DataSourceKind};

/// External selection the user makes at generation time
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    Project,
    ReportingPeriod,
    Indicator,
}

impl InputKind {
    pub fn all() -> [InputKind; 3] {
        [
            InputKind::Project,
            InputKind::ReportingPeriod,
            InputKind::Indicator,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InputKind::Project => "project",
            InputKind::ReportingPeriod => "reporting_period",
            InputKind::Indicator => "indicator",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "project" => Some(InputKind::Project),
            "reporting_period" => Some(InputKind::ReportingPeriod),
            "indicator" => Some(InputKind::Indicator),
            _ => None,
        }
    }

    /// Placeholder text of the picker
    pub fn prompt(&self) -> &'static str {
        match self {
            InputKind::Project => "Choose project...",
            InputKind::ReportingPeriod => "Choose reporting period...",
            InputKind::Indicator => "Choose indicator...",
        }
    }
}

impl std::fmt::Display for InputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Inputs a single data source kind needs at generation time.
/// Aggregate kinds, data tables and saved reports are self-contained.
pub fn inputs_for_kind(kind: DataSourceKind) -> &'static [InputKind] {
    match kind {
        DataSourceKind::SingleProject => &[InputKind::Project],
        DataSourceKind::SingleProjectReportingPeriod => {
            &[InputKind::Project, InputKind::ReportingPeriod]
        }
        DataSourceKind::SingleIndicator => &[InputKind::Indicator],
        DataSourceKind::AllProjects
        | DataSourceKind::AllIndicators
        | DataSourceKind::DataTable
        | DataSourceKind::SavedReport => &[],
    }
}

/// Required inputs for a set of bindings. Ids missing from the catalog add nothing.
pub fn required_inputs_for<'a>(
    bindings: impl IntoIterator<Item = &'a TemplateBinding>,
    catalog: &DataSourceCatalog,
) -> BTreeSet<InputKind> {
    bindings
        .into_iter()
        .filter_map(|b| catalog.find(&b.data_source_id))
        .flat_map(|d| inputs_for_kind(d.kind).iter().copied())
        .collect()
}

pub fn required_inputs(template: &ReportTemplate, catalog: &DataSourceCatalog) -> BTreeSet<InputKind> {
    required_inputs_for(&template.bindings, catalog)
}

/// Selections collected from the user, keyed by input kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectedInputs(BTreeMap<InputKind, String>);

impl CollectedInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: InputKind, id: impl Into<String>) -> Self {
        self.set(kind, id);
        self
    }

    pub fn set(&mut self, kind: InputKind, id: impl Into<String>) {
        self.0.insert(kind, id.into());
    }

    pub fn clear(&mut self, kind: InputKind) {
        self.0.remove(&kind);
    }

    /// Value for `kind`, empty strings count as absent
    pub fn get(&self, kind: InputKind) -> Option<&str> {
        self.0
            .get(&kind)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn has(&self, kind: InputKind) -> bool {
        self.get(kind).is_some()
    }
}

/// Required kinds without a non-empty collected value
pub fn missing_inputs(required: &BTreeSet<InputKind>, collected: &CollectedInputs) -> Vec<InputKind> {
    required
        .iter()
        .copied()
        .filter(|kind| !collected.has(*kind))
        .collect()
}

pub fn is_satisfied(required: &BTreeSet<InputKind>, collected: &CollectedInputs) -> bool {
    required.iter().all(|kind| collected.has(*kind))
}
