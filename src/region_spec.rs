use std::{
    collections::{HashMap, HashSet},
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use csv::{ReaderBuilder, StringRecord};
use thiserror::Error;

pub const INDEX_COLUMN: &str = "Index";

#[derive(Debug, Error)]
pub enum RegionSpecError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Region specification has no `Index` column")]
    MissingIndexColumn,

    #[error("Region specification has no `{0}` column")]
    MissingColumn(String),

    #[error("Row {row}: region index '{value}' is not an integer")]
    InvalidIndex { row: usize, value: String },

    #[error("Row {row}: value '{value}' in column `{column}` is not a number")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },
}

/// A table of per-region values keyed by the integer labels of an atlas.
///
/// The first row holds column names and must include `Index`; the remaining
/// columns can be named anything (r values, loadings, ...).
#[derive(Debug, Clone)]
pub struct RegionSpec {
    headers: StringRecord,
    indices: Vec<i64>,
    records: Vec<StringRecord>,
}

impl RegionSpec {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RegionSpecError> {
        let file = BufReader::new(File::open(path.as_ref())?);
        Self::from_reader(file)
    }

    pub fn from_reader(reader: impl Read) -> Result<Self, RegionSpecError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let index_column = headers
            .iter()
            .position(|name| name == INDEX_COLUMN)
            .ok_or(RegionSpecError::MissingIndexColumn)?;

        let records = reader.records().collect::<Result<Vec<_>, _>>()?;
        let indices = records
            .iter()
            .enumerate()
            .map(|(row, record)| {
                let value = record.get(index_column).unwrap_or_default();
                value
                    .parse::<i64>()
                    .map_err(|_| RegionSpecError::InvalidIndex {
                        row: row + 1,
                        value: value.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            headers,
            indices,
            records,
        })
    }

    pub fn indices(&self) -> &[i64] {
        &self.indices
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.headers.iter()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Build the region index → value lookup used to recolor an atlas.
    ///
    /// Regions outside `label_numbers` (when given) take `fill_value`, and
    /// index 0 always maps to `fill_value`. Later rows override earlier rows
    /// with the same index.
    pub fn value_map(
        &self,
        value_name: &str,
        label_numbers: Option<&[i64]>,
        fill_value: f64,
    ) -> Result<HashMap<i64, f64>, RegionSpecError> {
        let column = self
            .headers
            .iter()
            .position(|name| name == value_name)
            .ok_or_else(|| RegionSpecError::MissingColumn(value_name.to_string()))?;
        let retained: Option<HashSet<i64>> =
            label_numbers.map(|labels| labels.iter().copied().collect());

        let mut map = HashMap::with_capacity(self.indices.len() + 1);
        for (row, (&index, record)) in self.indices.iter().zip(&self.records).enumerate() {
            let value = if retained.as_ref().is_some_and(|set| !set.contains(&index)) {
                fill_value
            } else {
                let raw = record.get(column).unwrap_or_default();
                raw.parse::<f64>()
                    .map_err(|_| RegionSpecError::InvalidValue {
                        row: row + 1,
                        column: value_name.to_string(),
                        value: raw.to_string(),
                    })?
            };
            map.insert(index, value);
        }
        map.insert(0, fill_value);

        Ok(map)
    }
}
