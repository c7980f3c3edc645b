//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod csv_recorder;
pub mod file_config_adapter;
pub mod markdown_report;
