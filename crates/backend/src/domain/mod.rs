pub mod a001_report_template;
