//! Field attribute records read from GeoJSON and the clean-up applied to them
//! before they reach the attribute table

use crate::constants::HECTARES_TO_ACRES;
use crate::error::{LayoutError, Result};
use crate::labels::{ACRE_LABEL, FieldLabels, HECTARE_LABEL};
use crate::options::LayoutOptions;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, instrument, trace};

/// Raw field name holding the field's display name
pub const NAME_FIELD: &str = "name";

/// Raw field name holding the soil test date
pub const SOIL_TEST_DATE_FIELD: &str = "soilTest_date";

/// Index annotations appended to some field names
pub const INDEX_SUFFIXES: [&str; 8] = [" P1", " P2", " P3", " P4", " K1", " K2", " K3", " K4"];

/// Decimal places kept in table values
pub const TABLE_DECIMAL_PLACES: i32 = 2;

#[derive(Deserialize)]
struct GeoJsonCollection {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    features: Vec<GeoJsonFeature>,
}

#[derive(Deserialize)]
struct GeoJsonFeature {
    #[serde(default)]
    properties: Option<Map<String, Value>>,
}

/// Attributes of one field polygon
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldRecord {
    pub properties: Map<String, Value>,
}

impl FieldRecord {
    pub fn new(properties: Map<String, Value>) -> Self {
        Self { properties }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Move a property to a new key, keeping its value
    fn rename(&mut self, from: &str, to: &str) {
        if from == to {
            return;
        }
        if let Some(value) = self.properties.remove(from) {
            self.properties.insert(to.to_string(), value);
        }
    }
}

/// All field records of one data file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldCollection {
    pub records: Vec<FieldRecord>,
}

impl FieldCollection {
    pub fn new(records: Vec<FieldRecord>) -> Self {
        Self { records }
    }

    /// Read the feature properties of a GeoJSON FeatureCollection.
    /// Geometry is left to the GIS application.
    #[instrument(skip(source), fields(bytes = source.len()))]
    pub fn from_geojson(source: &str) -> Result<Self> {
        let doc: GeoJsonCollection = serde_json::from_str(source)?;
        if doc.kind != "FeatureCollection" {
            return Err(LayoutError::InvalidGeoJson(format!(
                "expected a FeatureCollection, found {}",
                doc.kind
            )));
        }

        let records: Vec<_> = doc
            .features
            .into_iter()
            .map(|f| FieldRecord::new(f.properties.unwrap_or_default()))
            .collect();

        debug!("Loaded {} field records", records.len());
        Ok(Self { records })
    }

    /// Number of features, i.e. attribute table rows before capping
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Remove P/K index annotations such as `" P2"` from field names
    pub fn strip_index_suffixes(&mut self) {
        for record in &mut self.records {
            if let Some(Value::String(name)) = record.properties.get_mut(NAME_FIELD) {
                for suffix in INDEX_SUFFIXES {
                    if name.contains(suffix) {
                        *name = name.replace(suffix, "");
                    }
                }
            }
        }
    }

    /// Drop fields that have no soil sample. Returns how many were removed.
    pub fn drop_unsampled(&mut self) -> usize {
        let before = self.records.len();
        self.records.retain(|r| {
            !matches!(r.get(SOIL_TEST_DATE_FIELD), None | Some(Value::Null))
        });
        let removed = before - self.records.len();
        if removed > 0 {
            debug!("Dropped {} fields without a soil sample", removed);
        }
        removed
    }

    /// Rename every known property to its UI label
    pub fn rename_to_ui(&mut self, labels: &FieldLabels) {
        for record in &mut self.records {
            let keys: Vec<String> = record.properties.keys().cloned().collect();
            for key in keys {
                if let Some(label) = labels.to_ui(&key) {
                    record.rename(&key, label);
                }
            }
        }
    }

    /// Relabel the hectare area column as acres and convert its values
    pub fn convert_area_to_acres(&mut self) {
        for record in &mut self.records {
            record.rename(HECTARE_LABEL, ACRE_LABEL);
            if let Some(value) = record.properties.get_mut(ACRE_LABEL) {
                if let Some(hectares) = value.as_f64() {
                    *value = Value::from(hectares * HECTARES_TO_ACRES);
                }
            }
        }
    }

    /// Round floating point values in `columns` to `places` decimals
    pub fn round_columns(&mut self, columns: &[String], places: i32) {
        let factor = 10f64.powi(places);
        for record in &mut self.records {
            for column in columns {
                if let Some(value) = record.properties.get_mut(column) {
                    if value.is_f64() {
                        if let Some(v) = value.as_f64() {
                            *value = Value::from((v * factor).round() / factor);
                        }
                    }
                }
            }
        }
    }

    /// Order records by the integer value of `key`.
    ///
    /// Records without a leading integer keep their relative order after the
    /// numbered ones.
    pub fn sort_by_name(&mut self, key: &str) {
        self.records
            .sort_by_key(|r| match r.get(key).and_then(leading_integer) {
                Some(n) => (false, n),
                None => (true, 0),
            });
    }

    /// Numeric values of a column, skipping missing and non-numeric entries
    pub fn numeric_values(&self, column: &str) -> Vec<f64> {
        self.records
            .iter()
            .filter_map(|r| r.get(column).and_then(Value::as_f64))
            .collect()
    }

    /// Prepare the records for the attribute table: UI labels, optional acre
    /// conversion, rounding of the table columns and ordering by name.
    /// Returns the feature count.
    #[instrument(skip_all, fields(records = self.records.len()))]
    pub fn prepare(
        &mut self,
        options: &LayoutOptions,
        labels: &FieldLabels,
        columns: &[String],
    ) -> usize {
        self.rename_to_ui(labels);
        if options.area_acres {
            self.convert_area_to_acres();
        }
        self.round_columns(columns, TABLE_DECIMAL_PLACES);

        let name_key = labels.to_ui(NAME_FIELD).unwrap_or(NAME_FIELD).to_string();
        self.sort_by_name(&name_key);

        trace!("Prepared {} records", self.records.len());
        self.records.len()
    }
}

/// Leading integer of a name, e.g. `"12 North"` -> 12
fn leading_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim_start();
            let end = s
                .char_indices()
                .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && c == '-')))
                .map(|(i, _)| i)
                .unwrap_or(s.len());
            s[..end].parse().ok()
        }
        _ => None,
    }
}
