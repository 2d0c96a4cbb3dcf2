use std::{
    collections::{HashMap, HashSet},
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use csv::{ReaderBuilder, WriterBuilder};
use ndarray::{Array1, Array2, Axis};
use rayon::prelude::*;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VertexFileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Line {line}: '{value}' is not a number")]
    InvalidValue { line: usize, value: String },

    #[error("Line {line}: expected {expected} columns, found {found}")]
    InconsistentColumns {
        line: usize,
        expected: usize,
        found: usize,
    },
}

/// Grayordinate values as exchanged with `wb_command -cifti-convert`.
///
/// Rows are vertices/voxels and columns are maps. Label images carry their
/// integer keys in the first column.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexTable {
    data: Array2<f64>,
}

impl VertexTable {
    pub fn new(data: Array2<f64>) -> Self {
        Self { data }
    }

    pub fn read(path: impl AsRef<Path>) -> Result<Self, VertexFileError> {
        Self::from_reader(BufReader::new(File::open(path.as_ref())?))
    }

    pub fn from_reader(reader: impl Read) -> Result<Self, VertexFileError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .delimiter(b'\t')
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut values = Vec::new();
        let mut columns = None;
        let mut rows = 0;
        for (line, record) in reader.records().enumerate() {
            let record = record?;
            let line = line + 1;
            let expected = *columns.get_or_insert(record.len());
            if record.len() != expected {
                return Err(VertexFileError::InconsistentColumns {
                    line,
                    expected,
                    found: record.len(),
                });
            }
            for field in record.iter() {
                let value = field
                    .parse::<f64>()
                    .map_err(|_| VertexFileError::InvalidValue {
                        line,
                        value: field.to_string(),
                    })?;
                values.push(value);
            }
            rows += 1;
        }

        let data = Array2::from_shape_vec((rows, columns.unwrap_or(0)), values)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        Ok(Self { data })
    }

    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), VertexFileError> {
        let mut file = BufWriter::new(File::create(path.as_ref())?);
        self.to_writer(&mut file)?;
        file.flush()?;
        Ok(())
    }

    pub fn to_writer(&self, writer: impl Write) -> Result<(), VertexFileError> {
        let mut writer = WriterBuilder::new().delimiter(b'\t').from_writer(writer);
        for row in self.data.rows() {
            writer.write_record(row.iter().map(|&value| format_value(value)))?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    /// (rows, columns)
    pub fn dim(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Replace every column of each row whose label is not in `label_numbers`
    /// with `fill_value`.
    pub fn retain_labels(&mut self, label_numbers: &[i64], fill_value: f64) {
        if self.data.ncols() == 0 {
            return;
        }
        let retained: HashSet<i64> = label_numbers.iter().copied().collect();

        self.data
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .for_each(|mut row| {
                let keep = as_label(row[0]).is_some_and(|label| retained.contains(&label));
                if !keep {
                    row.fill(fill_value);
                }
            });
    }

    /// Look up each row's label in `map`, producing a single-column table.
    ///
    /// Labels missing from `map` take `fill_value`.
    pub fn map_first_column(&self, map: &HashMap<i64, f64>, fill_value: f64) -> VertexTable {
        if self.data.ncols() == 0 {
            return VertexTable::new(Array2::zeros((self.data.nrows(), 1)));
        }

        let labels = self.data.column(0).to_vec();
        let mapped: Vec<f64> = labels
            .into_par_iter()
            .map(|value| {
                as_label(value)
                    .and_then(|label| map.get(&label).copied())
                    .unwrap_or(fill_value)
            })
            .collect();

        VertexTable::new(Array1::from_vec(mapped).insert_axis(Axis(1)))
    }
}

fn as_label(value: f64) -> Option<i64> {
    (value.is_finite() && value.fract() == 0.0).then_some(value as i64)
}

fn format_value(value: f64) -> String {
    match as_label(value) {
        Some(label) if value.abs() < 1e15 => label.to_string(),
        _ => value.to_string(),
    }
}
