//! Port traits: the boundaries between the analysis core and its collaborators.

pub mod config_port;
pub mod data_port;
pub mod predictor_port;
pub mod sentiment_port;
