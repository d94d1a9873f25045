//! Command handlers for the `stick-cursor` binary.

pub mod curve;
pub mod run;
pub mod settings;
