pub mod a001_report_template;
pub mod common;
