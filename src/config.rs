use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::data::loader::LoadOptions;
use crate::data::schema::TableSchema;
use crate::error::{Error, Result};
use crate::output::packager::FileAttributes;

/// Everything a run needs. Missing fields in a config file fall back to
/// the defaults below.
///
/// ```json
/// {
///   "input": "soilC.xlsx",
///   "sheet": "combined",
///   "output": "soc_rr.nc",
///   "attributes": { "version": 2025, "institutions": "OU-ORNL" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub sheet: String,
    pub header_row: usize,
    pub columns: Option<Vec<String>>,
    pub na_values: Vec<String>,
    pub keep_default_na: bool,
    pub output: PathBuf,
    pub schema: TableSchema,
    pub attributes: FileAttributes,
    /// Fetched into the input's directory before loading, unless already there.
    pub source_url: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let load = LoadOptions::default();
        PipelineConfig {
            input: PathBuf::from("soilC.xlsx"),
            sheet: load.sheet,
            header_row: load.header_row,
            columns: load.columns,
            na_values: load.na_values,
            keep_default_na: load.keep_default_na,
            output: PathBuf::from("soc_rr.nc"),
            schema: TableSchema::default(),
            attributes: FileAttributes::default(),
            source_url: None,
        }
    }
}

impl PipelineConfig {
    /// Read a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            sheet: self.sheet.clone(),
            header_row: self.header_row,
            columns: self.columns.clone(),
            na_values: self.na_values.clone(),
            keep_default_na: self.keep_default_na,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::dataset::AttrValue;

    #[test]
    fn defaults_match_the_soil_carbon_sheet() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.input, PathBuf::from("soilC.xlsx"));
        assert_eq!(cfg.sheet, "combined");
        assert_eq!(cfg.output, PathBuf::from("soc_rr.nc"));
        assert_eq!(cfg.na_values, vec!["NA", "missing"]);
        assert_eq!(cfg.schema.soc_elevated, "SOC.elev (g/m2)");
        assert_eq!(cfg.load_options(), LoadOptions::default());
    }

    #[test]
    fn partial_file_overrides_only_named_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        std::fs::write(
            &path,
            r#"{
                "input": "data/soil.csv",
                "schema": { "latitude": "lat_dd" },
                "attributes": { "history": "converted" }
            }"#,
        )
        .unwrap();

        let cfg = PipelineConfig::from_file(&path).unwrap();
        assert_eq!(cfg.input, PathBuf::from("data/soil.csv"));
        assert_eq!(cfg.sheet, "combined");
        assert_eq!(cfg.schema.latitude, "lat_dd");
        assert_eq!(cfg.schema.longitude, "Longitude");
        let attrs = cfg.attributes.to_attributes();
        assert_eq!(attrs["history"], AttrValue::Text("converted".into()));
        assert_eq!(attrs["version"], AttrValue::Int(2025));
    }

    #[test]
    fn unknown_file_and_bad_json_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            PipelineConfig::from_file(&dir.path().join("absent.json")),
            Err(Error::Io { .. })
        ));
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ input: ").unwrap();
        assert!(matches!(PipelineConfig::from_file(&path), Err(Error::Config(_))));
    }
}
