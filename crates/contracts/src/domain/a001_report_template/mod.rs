pub mod aggregate;
pub mod binding;
pub mod template_file;
