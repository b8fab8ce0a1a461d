//! Reference data offered in the generation dialog

use contracts::usecases::u501_generate_report::{InputKind, LookupOption};

const PROJECTS: &[(&str, &str)] = &[
    ("proj-1", "Water Sanitation Initiative"),
    ("proj-2", "Education for All"),
    ("proj-3", "Healthcare Access Program"),
    ("proj-4", "Agricultural Development"),
    ("proj-5", "Infrastructure Improvement"),
];

const REPORTING_PERIODS: &[(&str, &str)] = &[
    ("rp-2", "Q2 2024"),
    ("rp-3", "Q3 2024"),
    ("rp-4", "Q4 2024"),
    ("rp-5", "Q1 2025"),
    ("rp-6", "Q2 2025"),
    ("rp-7", "Q3 2025"),
    ("rp-8", "Q4 2025"),
];

const INDICATORS: &[(&str, &str)] = &[
    ("ind-1", "Number of beneficiaries reached"),
    ("ind-2", "Training sessions completed"),
    ("ind-3", "Wells constructed"),
    ("ind-4", "Students enrolled"),
    ("ind-5", "Healthcare visits"),
];

fn table(kind: InputKind) -> &'static [(&'static str, &'static str)] {
    match kind {
        InputKind::Project => PROJECTS,
        InputKind::ReportingPeriod => REPORTING_PERIODS,
        InputKind::Indicator => INDICATORS,
    }
}

pub fn options_for(kind: InputKind) -> Vec<LookupOption> {
    table(kind)
        .iter()
        .map(|(id, name)| LookupOption::new(id, name))
        .collect()
}

pub fn contains(kind: InputKind, id: &str) -> bool {
    table(kind).iter().any(|(known, _)| *known == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options() {
        assert_eq!(options_for(InputKind::Project).len(), 5);
        assert_eq!(
            options_for(InputKind::ReportingPeriod)[0],
            LookupOption::new("rp-2", "Q2 2024")
        );
        assert!(contains(InputKind::Indicator, "ind-3"));
        assert!(!contains(InputKind::Indicator, "proj-1"));
    }
}
