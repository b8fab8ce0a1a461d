pub mod db;
pub mod file_storage;
