//! Concrete adapter implementations for ports, plus JSON presentation.

pub mod chart_json;
pub mod csv_adapter;
pub mod file_config_adapter;
pub mod headline_csv_adapter;
