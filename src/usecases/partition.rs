//! Region partitioning: filter the dataset to one region's boundary and
//! group survivors by forecast category.
//!
//! Pure fold, no I/O. The same `(boundary, records)` pair always yields
//! identical bucket contents and iteration order.

use crate::domain::{ForecastRecord, Partition};
use geo::{Intersects, MultiPolygon};

/// Partition `records` against a region boundary.
///
/// A record survives when it has a forecast (category is not the
/// unavailable sentinel) and its point intersects the boundary. The
/// intersection test is boundary-inclusive: a site sitting exactly on the
/// fence counts as inside. Survivors land in their category's bucket,
/// buckets created in first-seen order, records in dataset order.
///
/// An empty result is a valid outcome (region has no in-bounds
/// forecasts), not an error.
pub fn partition(boundary: &MultiPolygon<f64>, records: &[ForecastRecord]) -> Partition {
    records.iter().fold(Partition::new(), |mut grouped, record| {
        if let Some(category) = record.category {
            if boundary.intersects(&record.location) {
                grouped.push(category, record.clone());
            }
        }
        grouped
    })
}
