use std::path::PathBuf;

use serde::Serialize;

use crate::config::PipelineConfig;
use crate::data::derive::{append_response_ratio, RESPONSE_RATIO};
use crate::data::filter::drop_empty_rows;
use crate::data::schema::ColumnRole;
use crate::data::loader::load_table;
use crate::error::Result;
use crate::fetch::download_file;
use crate::output::ncfile::write_netcdf;
use crate::output::packager::package;

/// What one run did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub input: PathBuf,
    pub output: PathBuf,
    pub rows_loaded: usize,
    pub rows_dropped: usize,
    pub undefined_ratios: usize,
    pub sites_written: usize,
}

/// load → validate → clean → derive → package → write, once, in order.
///
/// Any error stops the run where it happens. Nothing is written to the
/// output path unless every earlier stage succeeded.
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Pipeline { config }
    }

    pub fn run(&self) -> Result<RunSummary> {
        let cfg = &self.config;

        let input = match &cfg.source_url {
            Some(url) => {
                let dir = cfg
                    .input
                    .parent()
                    .map(PathBuf::from)
                    .unwrap_or_default();
                download_file(url, &dir)?
            }
            None => cfg.input.clone(),
        };

        let table = load_table(&input, &cfg.load_options())?;
        cfg.schema.validate(&table)?;
        let rows_loaded = table.len();

        let table = drop_empty_rows(table);
        let rows_dropped = rows_loaded - table.len();

        let table = append_response_ratio(
            table,
            cfg.schema.column(ColumnRole::SocElevated),
            cfg.schema.column(ColumnRole::SocAmbient),
        )?;
        let dataset = package(&table, &cfg.schema, &cfg.attributes)?;
        drop(table);

        let undefined_ratios = dataset
            .variable(RESPONSE_RATIO)
            .and_then(|v| v.data.as_floats())
            .map_or(0, |values| values.iter().filter(|v| v.is_nan()).count());

        write_netcdf(&dataset, &cfg.output)?;

        Ok(RunSummary {
            input,
            output: cfg.output.clone(),
            rows_loaded,
            rows_dropped,
            undefined_ratios,
            sites_written: dataset.site_count(),
        })
    }
}
