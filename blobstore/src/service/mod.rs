pub mod digest;
pub mod file;
pub mod reader;
