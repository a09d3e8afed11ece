//! Soil-carbon response-ratio converter.
//!
//! Reads paired elevated/ambient CO2 soil organic carbon observations from a
//! spreadsheet, derives `soc_rr = ln(SOC_elevated / SOC_ambient)` per site and
//! writes it, with `lat`/`lon` coordinates and CF-style metadata, to NetCDF.
//!
//! See [`pipeline::Pipeline`] for the full run and the [`data`] and
//! [`output`] modules for the individual stages.

pub mod config;
pub mod data;
pub mod error;
pub mod fetch;
pub mod output;
pub mod pipeline;

pub use config::PipelineConfig;
pub use error::{Error, Result};
pub use pipeline::{Pipeline, RunSummary};
