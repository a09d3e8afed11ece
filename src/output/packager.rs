use serde::{Deserialize, Serialize};

use super::dataset::{AttrValue, Attributes, SiteDataset, COORDINATES_ATTR};
use crate::data::derive::RESPONSE_RATIO;
use crate::data::model::ObservationTable;
use crate::data::schema::{ColumnRole, TableSchema};
use crate::error::Result;

pub const LAT: &str = "lat";
pub const LON: &str = "lon";

pub const RESPONSE_RATIO_STANDARD_NAME: &str = "soil_organic_carbon_response_ratio";
pub const RESPONSE_RATIO_UNITS: &str = "unitless";

/// File-level provenance block written as global attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAttributes {
    pub title: String,
    /// Pinned to the pipeline revision, not derived from the data.
    pub version: i32,
    pub institutions: String,
    pub source: String,
    pub history: String,
    pub references: String,
}

impl Default for FileAttributes {
    fn default() -> Self {
        FileAttributes {
            title: "Meta-analysis of soil carbon data".to_string(),
            version: 2025,
            institutions: "OU-ORNL".to_string(),
            source: "Data downloaded from ...".to_string(),
            history: " ".to_string(),
            references: " ".to_string(),
        }
    }
}

impl FileAttributes {
    pub fn to_attributes(&self) -> Attributes {
        [
            ("title", AttrValue::from(self.title.as_str())),
            ("version", AttrValue::from(self.version)),
            ("institutions", AttrValue::from(self.institutions.as_str())),
            ("source", AttrValue::from(self.source.as_str())),
            ("history", AttrValue::from(self.history.as_str())),
            ("references", AttrValue::from(self.references.as_str())),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }
}

/// Build the single-variable output product from a derived table.
///
/// Order matters: coordinates are renamed to `lat`/`lon` before any
/// attribute is attached, and everything except `soc_rr` and its two
/// coordinates is dropped last.
pub fn package(
    table: &ObservationTable,
    schema: &TableSchema,
    file_attributes: &FileAttributes,
) -> Result<SiteDataset> {
    let latitude = schema.column(ColumnRole::Latitude);
    let longitude = schema.column(ColumnRole::Longitude);
    let mut ds = SiteDataset::from_table(table, &[latitude, longitude]);

    ds.rename_variable(latitude, LAT)?;
    ds.rename_variable(longitude, LON)?;

    ds.set_attributes(
        RESPONSE_RATIO,
        [
            ("standard_name", AttrValue::from(RESPONSE_RATIO_STANDARD_NAME)),
            ("units", AttrValue::from(RESPONSE_RATIO_UNITS)),
            (COORDINATES_ATTR, AttrValue::from(format!("{LAT} {LON}"))),
        ],
    )?;
    ds.set_attributes(
        LAT,
        [
            ("standard_name", AttrValue::from("latitude")),
            ("units", AttrValue::from("degrees_north")),
        ],
    )?;
    ds.set_attributes(
        LON,
        [
            ("standard_name", AttrValue::from("longitude")),
            ("units", AttrValue::from("degrees_east")),
        ],
    )?;

    let mut ds = ds.select(&[RESPONSE_RATIO])?;
    ds.attributes = file_attributes.to_attributes();
    ds.check_lengths()?;

    log::info!(
        "packaged {} sites into {} variables",
        ds.site_count(),
        ds.variables.len()
    );
    Ok(ds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::derive::append_response_ratio;
    use crate::data::model::CellValue;
    use crate::error::Error;

    fn derived() -> ObservationTable {
        let mut t = ObservationTable::new(vec![
            "Site".into(),
            "Latitude".into(),
            "Longitude".into(),
            "SOC.elev (g/m2)".into(),
            "SOC.amb (g/m2)".into(),
        ]);
        t.push_row(vec![
            CellValue::Text("Duke".into()),
            CellValue::Float(10.0),
            CellValue::Float(20.0),
            CellValue::Float(200.0),
            CellValue::Float(100.0),
        ]);
        t.push_row(vec![
            CellValue::Text("ORNL".into()),
            CellValue::Float(11.0),
            CellValue::Float(21.0),
            CellValue::Missing,
            CellValue::Float(100.0),
        ]);
        append_response_ratio(t, "SOC.elev (g/m2)", "SOC.amb (g/m2)").unwrap()
    }

    #[test]
    fn emits_only_ratio_and_coordinates() {
        let ds = package(&derived(), &TableSchema::default(), &FileAttributes::default())
            .unwrap();
        let names: Vec<&str> = ds.variables.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec![LAT, LON, RESPONSE_RATIO]);
        assert_eq!(ds.site_count(), 2);

        let rr = ds.variable(RESPONSE_RATIO).unwrap();
        assert_eq!(rr.coordinates(), vec![LAT, LON]);
        assert_eq!(
            rr.attributes["standard_name"],
            AttrValue::Text(RESPONSE_RATIO_STANDARD_NAME.into())
        );
        assert_eq!(rr.attributes["units"], AttrValue::Text("unitless".into()));

        let lat = ds.variable(LAT).unwrap();
        assert_eq!(lat.data.as_floats().unwrap(), &[10.0, 11.0]);
        assert_eq!(lat.attributes["units"], AttrValue::Text("degrees_north".into()));
        let lon = ds.variable(LON).unwrap();
        assert_eq!(lon.attributes["standard_name"], AttrValue::Text("longitude".into()));
    }

    #[test]
    fn file_attributes_are_the_fixed_block() {
        let ds = package(&derived(), &TableSchema::default(), &FileAttributes::default())
            .unwrap();
        assert_eq!(ds.attributes.len(), 6);
        assert_eq!(ds.attributes["version"], AttrValue::Int(2025));
        assert_eq!(ds.attributes["institutions"], AttrValue::Text("OU-ORNL".into()));
    }

    #[test]
    fn coordinates_follow_the_schema_roles() {
        let mut t = derived();
        t.column_names[1] = "lat_dd".into();
        t.column_names[2] = "lon_dd".into();
        let schema = TableSchema {
            latitude: "lat_dd".into(),
            longitude: "lon_dd".into(),
            ..TableSchema::default()
        };
        let ds = package(&t, &schema, &FileAttributes::default()).unwrap();
        assert_eq!(ds.variable(LAT).unwrap().data.as_floats().unwrap(), &[10.0, 11.0]);
        assert_eq!(ds.variable(LON).unwrap().data.as_floats().unwrap(), &[20.0, 21.0]);
        assert!(ds.variable("lat_dd").is_none());

        let err = package(&derived(), &schema, &FileAttributes::default()).unwrap_err();
        assert!(matches!(err, Error::MissingColumn { column } if column == "lat_dd"));
    }

    #[test]
    fn needs_the_derived_column() {
        let mut t = derived();
        t.column_names[5] = "other".into();
        let err = package(&t, &TableSchema::default(), &FileAttributes::default()).unwrap_err();
        assert!(matches!(err, Error::MissingColumn { column } if column == RESPONSE_RATIO));
    }
}
