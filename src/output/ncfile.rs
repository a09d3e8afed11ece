use std::path::Path;

use netcdf::AttributeValue;

use super::dataset::{
    AttrValue, Attributes, SiteDataset, Variable, VariableData, VariableKind, SITE_DIM,
};
use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

/// Write `ds` as a NetCDF-4 file at `path`, replacing any existing file.
///
/// Every variable is `f64` along `site` with a NaN fill value; coordinates
/// are written before data variables. A failure part-way leaves whatever
/// was already on disk, which callers must not trust.
///
/// NetCDF has no fixed zero-length dimension: with no sites left, `site`
/// is written as an UNLIMITED dimension of current length 0.
pub fn write_netcdf(ds: &SiteDataset, path: &Path) -> Result<()> {
    ds.check_lengths()?;
    if let Some(var) = ds.variables.iter().find(|v| v.data.as_floats().is_none()) {
        return Err(Error::UnsupportedVariable(var.name.clone()));
    }

    let mut file = netcdf::create(path)?;
    file.add_dimension(SITE_DIM, ds.site_count())?;

    for (name, value) in &ds.attributes {
        file.add_attribute(name, to_nc(value))?;
    }

    let ordered = ds
        .variables
        .iter()
        .filter(|v| v.kind == VariableKind::Coordinate)
        .chain(ds.variables.iter().filter(|v| v.kind == VariableKind::Data));

    for var in ordered {
        let Some(values) = var.data.as_floats() else {
            return Err(Error::UnsupportedVariable(var.name.clone()));
        };
        let mut nc_var = file.add_variable::<f64>(&var.name, &[SITE_DIM])?;
        nc_var.set_fill_value(f64::NAN)?;
        for (key, value) in &var.attributes {
            nc_var.put_attribute(key, to_nc(value))?;
        }
        if !values.is_empty() {
            nc_var.put_values(values, ..)?;
        }
        log::debug!("wrote variable '{}' ({} values)", var.name, values.len());
    }

    log::info!(
        "wrote {} variables x {} sites to {}",
        ds.variables.len(),
        ds.site_count(),
        path.display()
    );
    Ok(())
}

fn to_nc(value: &AttrValue) -> AttributeValue {
    match value {
        AttrValue::Text(s) => AttributeValue::Str(s.clone()),
        AttrValue::Int(i) => AttributeValue::Int(*i),
        AttrValue::Float(f) => AttributeValue::Double(*f),
    }
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

/// Read back a file produced by [`write_netcdf`].
///
/// Variables named by another variable's `coordinates` attribute come back
/// as coordinates. Reserved attributes (`_FillValue` and friends) are skipped.
pub fn read_netcdf(path: &Path) -> Result<SiteDataset> {
    let file = netcdf::open(path)?;

    let attributes = read_attributes(file.attributes())?;

    let mut variables = Vec::new();
    for nc_var in file.variables() {
        let values = if nc_var.len() == 0 {
            Vec::new()
        } else {
            nc_var.get_values::<f64, _>(..)?
        };
        variables.push(Variable {
            name: nc_var.name(),
            kind: VariableKind::Data,
            data: VariableData::Float(values),
            attributes: read_attributes(nc_var.attributes())?,
        });
    }

    let coordinate_names: Vec<String> = variables
        .iter()
        .flat_map(|v| v.coordinates().into_iter().map(str::to_string))
        .collect();
    for var in &mut variables {
        if coordinate_names.contains(&var.name) {
            var.kind = VariableKind::Coordinate;
        }
    }

    Ok(SiteDataset {
        variables,
        attributes,
    })
}

fn read_attributes<'f>(attrs: impl Iterator<Item = netcdf::Attribute<'f>>) -> Result<Attributes> {
    let mut out = Attributes::new();
    for attr in attrs {
        if attr.name().starts_with('_') {
            continue;
        }
        out.insert(attr.name().to_string(), from_nc(attr.value()?));
    }
    Ok(out)
}

fn from_nc(value: AttributeValue) -> AttrValue {
    match value {
        AttributeValue::Str(s) => AttrValue::Text(s),
        AttributeValue::Int(i) => AttrValue::Int(i),
        AttributeValue::Short(i) => AttrValue::Int(i32::from(i)),
        AttributeValue::Double(f) => AttrValue::Float(f),
        AttributeValue::Float(f) => AttrValue::Float(f64::from(f)),
        other => AttrValue::Text(format!("{other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, ObservationTable};
    use crate::output::dataset::COORDINATES_ATTR;

    fn dataset() -> SiteDataset {
        let mut t = ObservationTable::new(vec!["lat".into(), "lon".into(), "v".into()]);
        t.push_row(vec![
            CellValue::Float(10.0),
            CellValue::Float(20.0),
            CellValue::Float(0.25),
        ]);
        t.push_row(vec![
            CellValue::Float(11.0),
            CellValue::Float(21.0),
            CellValue::Missing,
        ]);
        let mut ds = SiteDataset::from_table(&t, &["lat", "lon"]);
        ds.set_attributes(
            "v",
            [
                ("standard_name", AttrValue::from("thing")),
                (COORDINATES_ATTR, AttrValue::from("lat lon")),
            ],
        )
        .unwrap();
        ds.attributes.insert("version".into(), AttrValue::Int(7));
        ds
    }

    #[test]
    fn file_reads_back_with_attributes_and_nans() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.nc");
        write_netcdf(&dataset(), &path).unwrap();

        let back = read_netcdf(&path).unwrap();
        assert_eq!(back.site_count(), 2);
        assert_eq!(back.attributes["version"], AttrValue::Int(7));

        let v = back.variable("v").unwrap();
        assert_eq!(v.kind, VariableKind::Data);
        assert_eq!(v.coordinates(), vec!["lat", "lon"]);
        assert_eq!(v.attributes["standard_name"], AttrValue::Text("thing".into()));
        assert!(!v.attributes.contains_key("_FillValue"));
        let values = v.data.as_floats().unwrap();
        assert_eq!(values[0], 0.25);
        assert!(values[1].is_nan());

        assert_eq!(back.variable("lat").unwrap().kind, VariableKind::Coordinate);
        assert_eq!(
            back.variable("lon").unwrap().data.as_floats().unwrap(),
            &[20.0, 21.0]
        );
    }

    #[test]
    fn no_sites_writes_an_empty_unlimited_axis() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.nc");
        let t = ObservationTable::new(vec!["lat".into(), "lon".into(), "v".into()]);
        let ds = SiteDataset::from_table(&t, &["lat", "lon"]);
        write_netcdf(&ds, &path).unwrap();

        {
            let file = netcdf::open(&path).unwrap();
            let site = file.dimension(SITE_DIM).unwrap();
            assert_eq!(site.len(), 0);
            assert!(site.is_unlimited());
        }

        let back = read_netcdf(&path).unwrap();
        assert_eq!(back.variables.len(), 3);
        assert_eq!(back.site_count(), 0);
        back.check_lengths().unwrap();
    }

    #[test]
    fn text_variables_are_refused_before_touching_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.nc");
        let mut ds = dataset();
        ds.variables[2].data = VariableData::Text(vec!["a".into(), "b".into()]);
        assert!(matches!(
            write_netcdf(&ds, &path),
            Err(Error::UnsupportedVariable(name)) if name == "v"
        ));
        assert!(!path.exists());
    }
}
