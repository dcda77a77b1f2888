//! Geofence store. Implements BoundaryPort by parsing GeoJSON boundary
//! files into polygon geometry for point-in-polygon tests.
//!
//! Geometry stays in the file's native geographic lon/lat; no
//! reprojection happens here.

use crate::domain::BotError;
use crate::ports::BoundaryPort;
use geo::{Geometry, MultiPolygon, Polygon};
use geojson::GeoJson;
use std::path::Path;
use tracing::debug;

/// Loads region boundaries from GeoJSON files. Stateless; one instance
/// serves every region.
#[derive(Debug, Default)]
pub struct GeofenceStore;

impl GeofenceStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl BoundaryPort for GeofenceStore {
    async fn load(&self, path: &Path) -> Result<MultiPolygon<f64>, BotError> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| BotError::Data(format!("read boundary file {}: {e}", path.display())))?;
        let boundary = parse_boundary(&raw)
            .map_err(|e| BotError::Data(format!("boundary file {}: {e}", path.display())))?;
        debug!(path = %path.display(), polygons = boundary.0.len(), "loaded region boundary");
        Ok(boundary)
    }
}

/// Parse a GeoJSON document (FeatureCollection, single Feature, or bare
/// geometry) and collect every polygonal geometry into one MultiPolygon.
/// Non-areal geometries (points, lines) do not define a fence and are
/// ignored; a document with no polygons at all is an error.
fn parse_boundary(raw: &str) -> Result<MultiPolygon<f64>, String> {
    let geojson: GeoJson = raw.parse().map_err(|e| format!("invalid GeoJSON: {e}"))?;

    let mut polygons: Vec<Polygon<f64>> = Vec::new();
    match &geojson {
        GeoJson::FeatureCollection(fc) => {
            for feature in &fc.features {
                if let Some(geometry) = &feature.geometry {
                    collect_polygons(geometry, &mut polygons)?;
                }
            }
        }
        GeoJson::Feature(feature) => {
            if let Some(geometry) = &feature.geometry {
                collect_polygons(geometry, &mut polygons)?;
            }
        }
        GeoJson::Geometry(geometry) => collect_polygons(geometry, &mut polygons)?,
    }

    if polygons.is_empty() {
        return Err("no polygon geometry in boundary file".to_string());
    }
    Ok(MultiPolygon(polygons))
}

fn collect_polygons(
    geometry: &geojson::Geometry,
    out: &mut Vec<Polygon<f64>>,
) -> Result<(), String> {
    let converted =
        Geometry::<f64>::try_from(geometry).map_err(|e| format!("unsupported geometry: {e}"))?;
    collect_from_geo(converted, out);
    Ok(())
}

fn collect_from_geo(geometry: Geometry<f64>, out: &mut Vec<Polygon<f64>>) {
    match geometry {
        Geometry::Polygon(p) => out.push(p),
        Geometry::MultiPolygon(mp) => out.extend(mp.0),
        Geometry::GeometryCollection(gc) => {
            for g in gc.0 {
                collect_from_geo(g, out);
            }
        }
        _ => {}
    }
}
