//! Trip-file validation
//!
//! Checks an uploaded CSV against the fixed trip schema before anything is
//! sent to storage: file extension, required header columns, and a minimum
//! data-row count. Validation is a pure function over the file name and
//! bytes; it performs no IO beyond reading the in-memory buffer.

use thiserror::Error;

/// Header columns every trip file must carry, in schema order.
pub const REQUIRED_COLUMNS: [&str; 4] = ["data", "lat", "lon", "vehicle"];

/// Minimum number of data rows (excluding the header) a trip file must have.
/// Files with 10 or fewer rows are rejected.
pub const MIN_DATA_ROWS: usize = 11;

/// Why a candidate file was rejected
#[derive(Debug, Error)]
pub enum ValidationError {
    /// File name does not end in `.csv`
    #[error("invalid extension")]
    InvalidExtension,

    /// One or more required header columns are absent
    #[error("missing columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// Fewer data rows than the schema requires
    #[error("too few rows: got {0}, at least {MIN_DATA_ROWS} required")]
    TooFewRows(usize),

    /// The content could not be parsed as CSV at all
    #[error("malformed csv: {0}")]
    Malformed(#[from] csv::Error),
}

impl ValidationError {
    /// Stable label for metrics
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationError::InvalidExtension => "invalid_extension",
            ValidationError::MissingColumns(_) => "missing_columns",
            ValidationError::TooFewRows(_) => "too_few_rows",
            ValidationError::Malformed(_) => "malformed",
        }
    }
}

/// Validate a candidate trip file.
///
/// The checks run in a fixed order: extension, header columns, row count.
/// Reader errors while scanning the content (ragged rows, invalid UTF-8)
/// surface as [`ValidationError::Malformed`] rather than being folded into
/// one of the named rejection kinds.
pub fn validate_csv(name: &str, content: &[u8]) -> Result<(), ValidationError> {
    if !name.ends_with(".csv") {
        return Err(ValidationError::InvalidExtension);
    }

    let mut reader = csv::Reader::from_reader(content);
    let headers = reader.headers()?.clone();

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|required| !headers.iter().any(|h| h == **required))
        .map(|s| s.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingColumns(missing));
    }

    let mut rows = 0usize;
    for record in reader.records() {
        record?;
        rows += 1;
    }
    if rows < MIN_DATA_ROWS {
        return Err(ValidationError::TooFewRows(rows));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn csv_with_rows(header: &str, rows: usize) -> Vec<u8> {
        let mut out = String::from(header);
        out.push('\n');
        let fields = header.split(',').count();
        for i in 0..rows {
            let row: Vec<String> = (0..fields).map(|f| format!("v{i}_{f}")).collect();
            out.push_str(&row.join(","));
            out.push('\n');
        }
        out.into_bytes()
    }

    #[test]
    fn rejects_non_csv_extension_regardless_of_content() {
        let content = csv_with_rows("data,lat,lon,vehicle", 20);
        assert!(matches!(
            validate_csv("trips.txt", &content),
            Err(ValidationError::InvalidExtension)
        ));
        assert!(matches!(
            validate_csv("trips", b"not even csv"),
            Err(ValidationError::InvalidExtension)
        ));
        // Suffix match is case-sensitive
        assert!(matches!(
            validate_csv("trips.CSV", &content),
            Err(ValidationError::InvalidExtension)
        ));
    }

    #[test]
    fn reports_exactly_the_missing_columns() {
        let content = csv_with_rows("data,lon,extra", 15);
        match validate_csv("trips.csv", &content) {
            Err(ValidationError::MissingColumns(missing)) => {
                assert_eq!(missing, vec!["lat".to_string(), "vehicle".to_string()]);
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn column_match_is_case_sensitive() {
        let content = csv_with_rows("Data,lat,lon,vehicle", 15);
        match validate_csv("trips.csv", &content) {
            Err(ValidationError::MissingColumns(missing)) => {
                assert_eq!(missing, vec!["data".to_string()]);
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn column_order_does_not_matter() {
        let content = csv_with_rows("vehicle,lon,lat,data", 11);
        assert!(validate_csv("trips.csv", &content).is_ok());
    }

    #[test]
    fn row_count_boundary_is_strictly_greater_than_ten() {
        let header = "data,lat,lon,vehicle";
        assert!(matches!(
            validate_csv("trips.csv", &csv_with_rows(header, 10)),
            Err(ValidationError::TooFewRows(10))
        ));
        assert!(validate_csv("trips.csv", &csv_with_rows(header, 11)).is_ok());
    }

    #[test]
    fn extra_columns_are_allowed() {
        let content = csv_with_rows("data,lat,lon,vehicle,extra", 15);
        assert!(validate_csv("trips.csv", &content).is_ok());
        assert!(matches!(
            validate_csv("trips.csv", &csv_with_rows("data,lat,lon,vehicle,extra", 9)),
            Err(ValidationError::TooFewRows(9))
        ));
    }

    #[test]
    fn ragged_rows_surface_as_malformed() {
        let content = b"data,lat,lon,vehicle\n1,2,3,4\n1,2\n".to_vec();
        assert!(matches!(
            validate_csv("trips.csv", &content),
            Err(ValidationError::Malformed(_))
        ));
    }

    #[test]
    fn invalid_utf8_surfaces_as_malformed() {
        let mut content = b"data,lat,lon,vehicle\n".to_vec();
        for _ in 0..12 {
            content.extend_from_slice(b"a,b,c,\xff\xfe\n");
        }
        assert!(matches!(
            validate_csv("trips.csv", &content),
            Err(ValidationError::Malformed(_))
        ));
    }

    #[test]
    fn empty_content_is_missing_every_column() {
        match validate_csv("trips.csv", b"") {
            Err(ValidationError::MissingColumns(missing)) => {
                assert_eq!(missing.len(), REQUIRED_COLUMNS.len());
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn failure_messages_name_the_rejection() {
        assert_eq!(ValidationError::InvalidExtension.to_string(), "invalid extension");
        assert_eq!(
            ValidationError::MissingColumns(vec!["lat".into(), "vehicle".into()]).to_string(),
            "missing columns: lat, vehicle"
        );
        assert_eq!(
            ValidationError::TooFewRows(9).to_string(),
            "too few rows: got 9, at least 11 required"
        );
    }
}
