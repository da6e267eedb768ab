//! Loading per-region metric rows exported from the metrics API.

use std::path::Path;

use mango_insights_geography_models::{RegionAggregate, RegionRowsDocument};

use crate::GeoError;

/// Parses a regional metrics body, accepting either a bare array or the
/// API's `{ "regioes": [...] }` wrapper.
///
/// # Errors
///
/// Returns [`GeoError::Json`] if the body is not valid JSON or the rows do
/// not have the expected fields.
pub fn parse_region_rows(body: &str) -> Result<Vec<RegionAggregate>, GeoError> {
    let doc: RegionRowsDocument = serde_json::from_str(body)?;
    Ok(doc.into_rows())
}

/// Reads and parses a regional metrics file.
///
/// # Errors
///
/// Returns [`GeoError`] if the file cannot be read or parsed.
pub async fn read_region_rows(path: &Path) -> Result<Vec<RegionAggregate>, GeoError> {
    let body = tokio::fs::read_to_string(path).await?;
    let rows = parse_region_rows(&body)?;
    log::info!("Loaded {} region rows from {}", rows.len(), path.display());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wrapped_rows() {
        let rows = parse_region_rows(
            r#"{"regioes":[{"regiao":"Sudeste","receita":2500.0,"registros":25,"quantidade_litros":12.5}]}"#,
        )
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].region, "Sudeste");
        assert_eq!(rows[0].quantity_liters, Some(12.5));
    }

    #[test]
    fn rejects_malformed_rows() {
        assert!(matches!(
            parse_region_rows(r#"[{"regiao":"Sul"}]"#),
            Err(GeoError::Json(_))
        ));
        assert!(parse_region_rows("not json").is_err());
    }

    #[tokio::test]
    async fn reads_rows_from_file() {
        let path = std::env::temp_dir().join("mango_insights_rows_test.json");
        tokio::fs::write(&path, r#"[{"regiao":"Norte","receita":1,"registros":1}]"#)
            .await
            .unwrap();
        let rows = read_region_rows(&path).await.unwrap();
        assert_eq!(rows, vec![RegionAggregate::new("Norte", 1.0, 1)]);
        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let path = std::env::temp_dir().join("mango_insights_rows_missing.json");
        assert!(matches!(
            read_region_rows(&path).await,
            Err(GeoError::Io(_))
        ));
    }
}
