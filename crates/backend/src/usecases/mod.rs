pub mod u501_generate_report;
