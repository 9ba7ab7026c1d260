//! History rendering and export.

pub mod generator;

pub use generator::{export_file_name, generate_history_document, render_record};
