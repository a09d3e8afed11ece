use serde::{Deserialize, Serialize};

use super::model::ObservationTable;
use crate::error::{Error, Result};

/// What a required column means to the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    Latitude,
    Longitude,
    SocElevated,
    SocAmbient,
}

/// Header text of each required source column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSchema {
    pub latitude: String,
    pub longitude: String,
    pub soc_elevated: String,
    pub soc_ambient: String,
}

impl Default for TableSchema {
    fn default() -> Self {
        TableSchema {
            latitude: "Latitude".to_string(),
            longitude: "Longitude".to_string(),
            soc_elevated: "SOC.elev (g/m2)".to_string(),
            soc_ambient: "SOC.amb (g/m2)".to_string(),
        }
    }
}

impl TableSchema {
    /// Required columns in declaration order. All of them are floats.
    pub fn required(&self) -> [(ColumnRole, &str); 4] {
        [
            (ColumnRole::Latitude, self.latitude.as_str()),
            (ColumnRole::Longitude, self.longitude.as_str()),
            (ColumnRole::SocElevated, self.soc_elevated.as_str()),
            (ColumnRole::SocAmbient, self.soc_ambient.as_str()),
        ]
    }

    pub fn column(&self, role: ColumnRole) -> &str {
        match role {
            ColumnRole::Latitude => &self.latitude,
            ColumnRole::Longitude => &self.longitude,
            ColumnRole::SocElevated => &self.soc_elevated,
            ColumnRole::SocAmbient => &self.soc_ambient,
        }
    }

    /// Check that every required column exists and reads as floats.
    /// Stops at the first offending column.
    pub fn validate(&self, table: &ObservationTable) -> Result<()> {
        for (role, name) in self.required() {
            if table.column_index(name).is_none() {
                return Err(Error::MissingColumn {
                    column: name.to_string(),
                });
            }
            table.float_column(name)?;
            log::debug!("column '{name}' validated as {role:?}");
        }
        Ok(())
    }
}
