//! State polygon sources.
//!
//! The map needs one `GeoJSON` `FeatureCollection` of Brazilian states.
//! [`HttpGeometrySource`] downloads it from a public URL and
//! [`FileGeometrySource`] reads a local copy. Both hand back the raw JSON
//! document; [`parse_features`] turns it into drawable [`MapFeature`]s.

use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;

use crate::GeoError;
use crate::projection::Projection;

/// Public `GeoJSON` of the 27 Brazilian states.
pub const DEFAULT_GEOJSON_URL: &str = "https://raw.githubusercontent.com/codeforamerica/click_that_hood/master/public/data/brazil-states.geojson";

/// Environment variable that overrides [`DEFAULT_GEOJSON_URL`].
pub const GEOJSON_URL_ENV: &str = "MANGO_GEOJSON_URL";

const USER_AGENT: &str = concat!("mango-insights/", env!("CARGO_PKG_VERSION"));

/// Property keys that may hold the UF code, in lookup order.
const CODE_PROPERTIES: &[&str] = &["sigla", "abbrev", "uf"];

/// Returns the geometry URL from [`GEOJSON_URL_ENV`], falling back to
/// [`DEFAULT_GEOJSON_URL`].
#[must_use]
pub fn geojson_url_from_env() -> String {
    geojson_url_or_default(std::env::var(GEOJSON_URL_ENV).ok())
}

fn geojson_url_or_default(url: Option<String>) -> String {
    url.filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_GEOJSON_URL.to_string())
}

/// A state polygon ready to draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapFeature {
    /// UF code (e.g. "SP"). Empty when the feature carries none.
    pub code: String,
    /// State name from the `name` property, if present.
    pub name: Option<String>,
    /// Non-empty SVG path data in canvas coordinates.
    pub path: String,
}

/// Somewhere the state polygons can be loaded from.
#[async_trait]
pub trait GeometrySource: Send + Sync {
    /// Loads the raw `GeoJSON` document.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError`] if the document cannot be fetched or is not
    /// valid JSON.
    async fn fetch(&self) -> Result<Value, GeoError>;

    /// Short description used in log lines.
    fn describe(&self) -> String;
}

/// Downloads the document over HTTP. No retries and no timeout.
pub struct HttpGeometrySource {
    client: reqwest::Client,
    url: String,
}

impl HttpGeometrySource {
    /// Creates a source for `url`.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError`] if the HTTP client cannot be built.
    pub fn new(url: impl Into<String>) -> Result<Self, GeoError> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl GeometrySource for HttpGeometrySource {
    async fn fetch(&self) -> Result<Value, GeoError> {
        log::info!("Fetching state geometry from {}", self.url);
        let resp = self.client.get(&self.url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(GeoError::Status {
                status,
                url: self.url.clone(),
            });
        }
        Ok(resp.json::<Value>().await?)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Reads the document from disk.
pub struct FileGeometrySource {
    path: PathBuf,
}

impl FileGeometrySource {
    /// Creates a source reading `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl GeometrySource for FileGeometrySource {
    async fn fetch(&self) -> Result<Value, GeoError> {
        log::info!("Reading state geometry from {}", self.path.display());
        let body = tokio::fs::read_to_string(&self.path).await?;
        Ok(serde_json::from_str(&body)?)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Extracts drawable features from a `FeatureCollection` document.
///
/// A document without a `features` array yields no features. Features with
/// missing or non-polygonal geometry, or whose rings are empty, are
/// skipped; partial maps are preferred over failing the whole render.
#[must_use]
pub fn parse_features(doc: &Value, projection: &Projection) -> Vec<MapFeature> {
    let Some(features) = doc.get("features").and_then(Value::as_array) else {
        log::warn!("GeoJSON document has no features array");
        return Vec::new();
    };

    let mut out = Vec::with_capacity(features.len());
    for (idx, feature) in features.iter().enumerate() {
        let properties = feature.get("properties");
        let code = properties
            .and_then(|props| {
                CODE_PROPERTIES
                    .iter()
                    .find_map(|key| props.get(*key).and_then(Value::as_str))
            })
            .unwrap_or_default()
            .to_string();
        let name = properties
            .and_then(|props| props.get("name"))
            .and_then(Value::as_str)
            .map(ToString::to_string);

        let Some(geometry) = feature.get("geometry").filter(|g| !g.is_null()) else {
            log::debug!("Skipping feature {idx} ({code}): no geometry");
            continue;
        };
        let geometry = match serde_json::from_value::<geojson::Geometry>(geometry.clone()) {
            Ok(g) => g,
            Err(e) => {
                log::debug!("Skipping feature {idx} ({code}): invalid geometry: {e}");
                continue;
            }
        };

        let path = projection.geometry_to_path(&geometry.value);
        if path.is_empty() {
            log::debug!("Skipping feature {idx} ({code}): nothing to draw");
            continue;
        }

        out.push(MapFeature { code, name, path });
    }

    log::debug!("Parsed {} of {} features", out.len(), features.len());
    out
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::projection::BRAZIL;

    fn polygon_feature(props: &Value) -> Value {
        json!({
            "type": "Feature",
            "properties": props,
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[-50.0, -20.0], [-49.0, -20.0], [-49.0, -19.0], [-50.0, -20.0]]]
            }
        })
    }

    #[test]
    fn missing_features_array_is_empty() {
        assert!(parse_features(&json!({}), &BRAZIL).is_empty());
        assert!(parse_features(&json!({"features": "nope"}), &BRAZIL).is_empty());
        let empty = json!({"type": "FeatureCollection", "features": []});
        assert!(parse_features(&empty, &BRAZIL).is_empty());
    }

    #[test]
    fn code_property_lookup_order() {
        let doc = json!({"features": [
            polygon_feature(&json!({"sigla": "SP", "uf": "XX", "name": "São Paulo"})),
            polygon_feature(&json!({"abbrev": "RS"})),
            polygon_feature(&json!({"uf": "BA"})),
            polygon_feature(&json!({})),
        ]});
        let features = parse_features(&doc, &BRAZIL);
        let codes: Vec<&str> = features.iter().map(|f| f.code.as_str()).collect();
        assert_eq!(codes, vec!["SP", "RS", "BA", ""]);
        assert_eq!(features[0].name.as_deref(), Some("São Paulo"));
        assert!(features[0].path.starts_with("M "));
    }

    #[test]
    fn unsupported_or_missing_geometry_is_skipped() {
        let doc = json!({"features": [
            {"type": "Feature", "properties": {"sigla": "AC"}, "geometry": null},
            {"type": "Feature", "properties": {"sigla": "AM"}},
            {"type": "Feature", "properties": {"sigla": "AP"},
             "geometry": {"type": "Point", "coordinates": [-50.0, 1.0]}},
            {"type": "Feature", "properties": {"sigla": "PA"},
             "geometry": {"type": "Polygon", "coordinates": [[]]}},
            {"type": "Feature", "properties": {"sigla": "RO"},
             "geometry": {"type": "Bogus", "coordinates": 3}},
            polygon_feature(&json!({"sigla": "TO"})),
        ]});
        let features = parse_features(&doc, &BRAZIL);
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].code, "TO");
    }

    #[test]
    fn blank_url_falls_back_to_default() {
        assert_eq!(geojson_url_or_default(None), DEFAULT_GEOJSON_URL);
        assert_eq!(geojson_url_or_default(Some("  ".to_string())), DEFAULT_GEOJSON_URL);
        assert_eq!(
            geojson_url_or_default(Some("http://localhost/br.json".to_string())),
            "http://localhost/br.json"
        );
    }

    #[test]
    fn env_var_overrides_default_url() {
        unsafe {
            std::env::set_var(GEOJSON_URL_ENV, "http://localhost/estados.geojson");
        }
        assert_eq!(geojson_url_from_env(), "http://localhost/estados.geojson");

        unsafe {
            std::env::set_var(GEOJSON_URL_ENV, "");
        }
        assert_eq!(geojson_url_from_env(), DEFAULT_GEOJSON_URL);

        unsafe {
            std::env::remove_var(GEOJSON_URL_ENV);
        }
        assert_eq!(geojson_url_from_env(), DEFAULT_GEOJSON_URL);
    }

    #[tokio::test]
    async fn http_source_reports_error_status() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/brazil-states.geojson", listener.local_addr().unwrap());
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            socket
                .write_all(
                    b"HTTP/1.1 404 Not Found\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
                )
                .await
                .unwrap();
        });

        let source = HttpGeometrySource::new(url.clone()).unwrap();
        match source.fetch().await {
            Err(GeoError::Status { status, url: failed }) => {
                assert_eq!(status, reqwest::StatusCode::NOT_FOUND);
                assert_eq!(failed, url);
            }
            other => panic!("expected a status error, got {other:?}"),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn file_source_reads_document() {
        let path = std::env::temp_dir().join("mango_insights_geometry_test.geojson");
        tokio::fs::write(&path, r#"{"type":"FeatureCollection","features":[]}"#)
            .await
            .unwrap();
        let source = FileGeometrySource::new(&path);
        let doc = source.fetch().await.unwrap();
        assert_eq!(doc["features"], json!([]));
        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn file_source_reports_bad_json() {
        let path = std::env::temp_dir().join("mango_insights_geometry_bad.geojson");
        tokio::fs::write(&path, "{").await.unwrap();
        let source = FileGeometrySource::new(&path);
        assert!(matches!(source.fetch().await, Err(GeoError::Json(_))));
        let _ = tokio::fs::remove_file(&path).await;
    }
}
