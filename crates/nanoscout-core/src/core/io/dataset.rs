use crate::core::error::DataFormatError;
use crate::core::models::record::RawRecord;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, instrument};

/// Header names the dataset must provide. Additional columns are ignored.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "Compound Composition",
    "Temperature",
    "Pressure",
    "Crystal Structure",
    "Lattice Parameter",
    "Band Gap",
    "Conductivity",
];

#[derive(Debug, Error)]
pub enum DatasetLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("Invalid dataset '{path}': {source}")]
    Format {
        path: String,
        source: DataFormatError,
    },
}

#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub fn read_records(path: &Path) -> Result<Vec<RawRecord>, DatasetLoadError> {
    let file = std::fs::File::open(path).map_err(|e| DatasetLoadError::Io {
        path: path.to_string_lossy().to_string(),
        source: e,
    })?;
    read_records_from(file, &path.to_string_lossy())
}

/// Reads records from any CSV source. `origin` names the source in error messages.
pub fn read_records_from<R: Read>(
    reader: R,
    origin: &str,
) -> Result<Vec<RawRecord>, DatasetLoadError> {
    let csv_error = |source: csv::Error| DatasetLoadError::Csv {
        path: origin.to_string(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers().map_err(csv_error)?.clone();
    if let Some(missing) = REQUIRED_COLUMNS
        .iter()
        .find(|column| !headers.iter().any(|header| header == **column))
    {
        return Err(DatasetLoadError::Format {
            path: origin.to_string(),
            source: DataFormatError::MissingColumn(*missing),
        });
    }

    let records = reader
        .deserialize::<RawRecord>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(csv_error)?;

    debug!("Read {} record(s) from {}", records.len(), origin);
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const HEADER: &str = "Compound Composition,Temperature,Pressure,Crystal Structure,Lattice Parameter,Band Gap,Conductivity";

    #[test]
    fn read_records_parses_rows_and_blank_cells() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("materials.csv");
        fs::write(
            &path,
            format!(
                "{HEADER}\nZn + O,450,1.0,Wurtzite,3.25,3.37,Low\nGa + N, ,0.8,,3.19,3.4,Moderate\n"
            ),
        )
        .unwrap();

        let records = read_records(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].composition, "Zn + O");
        assert_eq!(records[0].temperature, Some(450.0));
        assert_eq!(records[0].crystal_structure.as_deref(), Some("Wurtzite"));
        assert_eq!(records[1].temperature, None);
        assert_eq!(records[1].crystal_structure, None);
        assert_eq!(records[1].conductivity.as_deref(), Some("Moderate"));
    }

    #[test]
    fn extra_columns_are_ignored() {
        let data = format!("Id,{HEADER},Notes\n1,Zn + O,450,1.0,Cubic,4.2,3.3,High,ok\n");
        let records = read_records_from(data.as_bytes(), "inline").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].band_gap, Some(3.3));
    }

    #[test]
    fn missing_required_column_is_a_format_error() {
        let data = "Compound Composition,Temperature,Pressure,Lattice Parameter,Band Gap,Conductivity\nZn + O,1,1,1,1,Low\n";
        let result = read_records_from(data.as_bytes(), "inline");
        assert!(matches!(
            result,
            Err(DatasetLoadError::Format {
                source: DataFormatError::MissingColumn("Crystal Structure"),
                ..
            })
        ));
    }

    #[test]
    fn non_numeric_cell_is_a_csv_error() {
        let data = format!("{HEADER}\nZn + O,hot,1.0,Cubic,4.2,3.3,High\n");
        let result = read_records_from(data.as_bytes(), "inline");
        assert!(matches!(result, Err(DatasetLoadError::Csv { .. })));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempdir().unwrap();
        let result = read_records(&dir.path().join("absent.csv"));
        assert!(matches!(result, Err(DatasetLoadError::Io { .. })));
    }
}
