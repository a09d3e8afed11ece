use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::data::model::{CellValue, ObservationTable};
use crate::error::{Error, Result};

/// The single axis every variable is laid out along.
pub const SITE_DIM: &str = "site";

/// Attribute holding the space-separated names of a variable's coordinates.
pub const COORDINATES_ATTR: &str = "coordinates";

// ---------------------------------------------------------------------------
// Attribute values
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Text(String),
    Int(i32),
    Float(f64),
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Text(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Text(s)
    }
}

impl From<i32> for AttrValue {
    fn from(i: i32) -> Self {
        AttrValue::Int(i)
    }
}

impl AttrValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

pub type Attributes = BTreeMap<String, AttrValue>;

// ---------------------------------------------------------------------------
// Variables
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    Coordinate,
    Data,
}

#[derive(Debug, Clone, PartialEq)]
pub enum VariableData {
    Float(Vec<f64>),
    Text(Vec<String>),
}

impl VariableData {
    pub fn len(&self) -> usize {
        match self {
            VariableData::Float(v) => v.len(),
            VariableData::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_floats(&self) -> Option<&[f64]> {
        match self {
            VariableData::Float(v) => Some(v),
            VariableData::Text(_) => None,
        }
    }
}

/// One named array along the site axis, with its attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub kind: VariableKind,
    pub data: VariableData,
    pub attributes: Attributes,
}

impl Variable {
    /// Names listed in the `coordinates` attribute, in order.
    pub fn coordinates(&self) -> Vec<&str> {
        self.attributes
            .get(COORDINATES_ATTR)
            .and_then(AttrValue::as_text)
            .map(|s| s.split_whitespace().collect())
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// SiteDataset
// ---------------------------------------------------------------------------

/// Labelled arrays sharing one `site` dimension, plus file-level attributes.
/// Element `i` of every variable belongs to the same site.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SiteDataset {
    pub variables: Vec<Variable>,
    pub attributes: Attributes,
}

impl SiteDataset {
    /// Turn every column into a variable along `site`. Columns named in
    /// `coordinates` become coordinate variables, the rest data variables.
    /// Columns that read as numbers become floats (missing = NaN); anything
    /// else is kept as text.
    pub fn from_table(table: &ObservationTable, coordinates: &[&str]) -> Self {
        let variables = table
            .column_names
            .iter()
            .map(|name| {
                let data = match table.float_column(name) {
                    Ok(values) => VariableData::Float(values),
                    Err(_) => VariableData::Text(
                        table
                            .column(name)
                            .unwrap_or_default()
                            .into_iter()
                            .map(|cell| match cell {
                                CellValue::Missing => String::new(),
                                other => other.to_string(),
                            })
                            .collect(),
                    ),
                };
                let kind = if coordinates.contains(&name.as_str()) {
                    VariableKind::Coordinate
                } else {
                    VariableKind::Data
                };
                Variable {
                    name: name.clone(),
                    kind,
                    data,
                    attributes: Attributes::new(),
                }
            })
            .collect();

        SiteDataset {
            variables,
            attributes: Attributes::new(),
        }
    }

    /// Length of the site axis.
    pub fn site_count(&self) -> usize {
        self.variables.first().map_or(0, |v| v.data.len())
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name == name)
    }

    fn variable_mut(&mut self, name: &str) -> Result<&mut Variable> {
        self.variables
            .iter_mut()
            .find(|v| v.name == name)
            .ok_or_else(|| Error::MissingColumn {
                column: name.to_string(),
            })
    }

    /// Rename a variable. An existing variable already called `to` is replaced.
    pub fn rename_variable(&mut self, from: &str, to: &str) -> Result<()> {
        if from == to {
            return self.variable_mut(from).map(|_| ());
        }
        self.variable_mut(from)?;
        if self.variable(to).is_some() {
            log::warn!("variable '{to}' is replaced by renamed '{from}'");
            self.variables.retain(|v| v.name != to);
        }
        self.variable_mut(from)?.name = to.to_string();
        Ok(())
    }

    /// Add (or overwrite) attributes on one variable.
    pub fn set_attributes<I, K>(&mut self, name: &str, attrs: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, AttrValue)>,
        K: Into<String>,
    {
        let var = self.variable_mut(name)?;
        for (key, value) in attrs {
            var.attributes.insert(key.into(), value);
        }
        Ok(())
    }

    /// Keep only the named variables and the coordinates they reference.
    pub fn select(self, names: &[&str]) -> Result<Self> {
        let mut keep: BTreeSet<String> = BTreeSet::new();
        for name in names {
            let var = self.variable(name).ok_or_else(|| Error::MissingColumn {
                column: name.to_string(),
            })?;
            keep.insert(var.name.clone());
            for coord in var.coordinates() {
                if self.variable(coord).is_none() {
                    return Err(Error::MissingColumn {
                        column: coord.to_string(),
                    });
                }
                keep.insert(coord.to_string());
            }
        }

        let SiteDataset {
            variables,
            attributes,
        } = self;
        Ok(SiteDataset {
            variables: variables
                .into_iter()
                .filter(|v| keep.contains(&v.name))
                .collect(),
            attributes,
        })
    }

    /// Every variable must have exactly one value per site.
    pub fn check_lengths(&self) -> Result<()> {
        let expected = self.site_count();
        for var in &self.variables {
            if var.data.len() != expected {
                return Err(Error::LengthMismatch {
                    name: var.name.clone(),
                    len: var.data.len(),
                    expected,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ObservationTable {
        let mut t = ObservationTable::new(vec![
            "Latitude".into(),
            "Longitude".into(),
            "Site".into(),
            "rr".into(),
        ]);
        t.push_row(vec![
            CellValue::Float(10.0),
            CellValue::Float(20.0),
            CellValue::Text("Duke".into()),
            CellValue::Float(0.5),
        ]);
        t.push_row(vec![
            CellValue::Float(11.0),
            CellValue::Integer(21),
            CellValue::Missing,
            CellValue::Missing,
        ]);
        t
    }

    #[test]
    fn reshape_types_each_column() {
        let ds = SiteDataset::from_table(&table(), &["Latitude", "Longitude"]);
        assert_eq!(ds.site_count(), 2);
        assert_eq!(ds.variable("Latitude").unwrap().kind, VariableKind::Coordinate);
        assert_eq!(ds.variable("rr").unwrap().kind, VariableKind::Data);
        assert_eq!(
            ds.variable("Site").unwrap().data,
            VariableData::Text(vec!["Duke".into(), String::new()])
        );
        let rr = ds.variable("rr").unwrap().data.as_floats().unwrap();
        assert_eq!(rr[0], 0.5);
        assert!(rr[1].is_nan());
    }

    #[test]
    fn rename_then_attach() {
        let mut ds = SiteDataset::from_table(&table(), &["Latitude"]);
        ds.rename_variable("Latitude", "lat").unwrap();
        assert!(ds.variable("Latitude").is_none());
        ds.set_attributes("lat", [("units", AttrValue::from("degrees_north"))])
            .unwrap();
        assert_eq!(
            ds.variable("lat").unwrap().attributes["units"],
            AttrValue::Text("degrees_north".into())
        );
        assert!(ds.rename_variable("Depth", "depth").is_err());
        assert!(ds.set_attributes("Latitude", Vec::<(&str, AttrValue)>::new()).is_err());
    }

    #[test]
    fn select_keeps_referenced_coordinates() {
        let mut ds = SiteDataset::from_table(&table(), &["Latitude", "Longitude"]);
        ds.set_attributes("rr", [(COORDINATES_ATTR, AttrValue::from("Latitude Longitude"))])
            .unwrap();
        let ds = ds.select(&["rr"]).unwrap();
        let names: Vec<&str> = ds.variables.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["Latitude", "Longitude", "rr"]);
        assert_eq!(
            ds.variable("rr").unwrap().coordinates(),
            vec!["Latitude", "Longitude"]
        );
    }

    #[test]
    fn select_rejects_dangling_coordinate() {
        let mut ds = SiteDataset::from_table(&table(), &[]);
        ds.set_attributes("rr", [(COORDINATES_ATTR, AttrValue::from("lat lon"))])
            .unwrap();
        assert!(matches!(
            ds.select(&["rr"]),
            Err(Error::MissingColumn { column }) if column == "lat"
        ));
    }

    #[test]
    fn length_check_catches_ragged_variables() {
        let mut ds = SiteDataset::from_table(&table(), &[]);
        ds.check_lengths().unwrap();
        ds.variables[1].data = VariableData::Float(vec![1.0]);
        assert!(matches!(
            ds.check_lengths(),
            Err(Error::LengthMismatch { len: 1, expected: 2, .. })
        ));
    }

    #[test]
    fn attribute_values_deserialize_untagged() {
        let v: Attributes = serde_json::from_str(r#"{"version": 2025, "title": "t", "x": 1.5}"#)
            .unwrap();
        assert_eq!(v["version"], AttrValue::Int(2025));
        assert_eq!(v["title"], AttrValue::Text("t".into()));
        assert_eq!(v["x"], AttrValue::Float(1.5));
    }
}
