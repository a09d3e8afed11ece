//! Output layer: the site-indexed dataset model, the packager that fills it
//! from a derived table, and NetCDF serialization.

pub mod dataset;
pub mod ncfile;
pub mod packager;
