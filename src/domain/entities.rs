//! Domain entities. Pure data structures for the core business.
//!
//! No HTTP/GeoJSON wire types here — these are mapped from adapters.

use chrono::{DateTime, FixedOffset};
use geo::Point;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Pollution-risk label for a monitored site. The feed's
/// "Forecast not available" sentinel is not a member; records carry
/// `Option<ForecastCategory>` with `None` for unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ForecastCategory {
    Likely,
    Possible,
    Unlikely,
}

impl ForecastCategory {
    /// Display name, as it appears in summary lines.
    pub fn as_str(self) -> &'static str {
        match self {
            ForecastCategory::Likely => "Likely",
            ForecastCategory::Possible => "Possible",
            ForecastCategory::Unlikely => "Unlikely",
        }
    }
}

impl std::fmt::Display for ForecastCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One monitored site from the forecast dataset. Immutable once mapped.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRecord {
    pub site_name: String,
    /// Longitude/latitude in degrees, unprojected.
    pub location: Point<f64>,
    /// `None` = "Forecast not available".
    pub category: Option<ForecastCategory>,
    pub forecast_at: DateTime<FixedOffset>,
}

/// Per-region grouping of in-bounds records by category.
///
/// Buckets keep first-seen-category order; records inside a bucket keep
/// source dataset order. Built fresh per region per run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    groups: Vec<(ForecastCategory, Vec<ForecastRecord>)>,
}

impl Partition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record to its category bucket, creating the bucket on
    /// first sight of the category.
    pub fn push(&mut self, category: ForecastCategory, record: ForecastRecord) {
        match self.groups.iter_mut().find(|(c, _)| *c == category) {
            Some((_, records)) => records.push(record),
            None => self.groups.push((category, vec![record])),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of category buckets.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Total records across all buckets.
    pub fn record_count(&self) -> usize {
        self.groups.iter().map(|(_, r)| r.len()).sum()
    }

    /// Buckets in first-seen-category order.
    pub fn iter(&self) -> impl Iterator<Item = (ForecastCategory, &[ForecastRecord])> {
        self.groups.iter().map(|(c, r)| (*c, r.as_slice()))
    }

    pub fn get(&self, category: ForecastCategory) -> Option<&[ForecastRecord]> {
        self.groups
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, r)| r.as_slice())
    }
}

/// Display styling for a category. The glyph goes into summary text; the
/// colour is consumed only by the external map renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStyle {
    pub glyph: String,
    pub colour: String,
}

/// Externally supplied category → style mapping, passed into the formatter
/// so alternate stylings need no code change.
#[derive(Debug, Clone)]
pub struct StyleMap {
    styles: HashMap<ForecastCategory, CategoryStyle>,
}

impl StyleMap {
    pub fn new(styles: HashMap<ForecastCategory, CategoryStyle>) -> Self {
        Self { styles }
    }

    pub fn get(&self, category: ForecastCategory) -> Option<&CategoryStyle> {
        self.styles.get(&category)
    }
}

impl Default for StyleMap {
    fn default() -> Self {
        let style = |glyph: &str, colour: &str| CategoryStyle {
            glyph: glyph.to_string(),
            colour: colour.to_string(),
        };
        Self::new(HashMap::from([
            (ForecastCategory::Likely, style("❌", "red")),
            (ForecastCategory::Possible, style("⚠️", "orange")),
            (ForecastCategory::Unlikely, style("✅", "green")),
        ]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(name: &str) -> ForecastRecord {
        ForecastRecord {
            site_name: name.to_string(),
            location: Point::new(151.27, -33.89),
            category: Some(ForecastCategory::Unlikely),
            forecast_at: FixedOffset::east_opt(11 * 3600)
                .unwrap()
                .with_ymd_and_hms(2024, 1, 12, 6, 30, 0)
                .unwrap(),
        }
    }

    #[test]
    fn partition_keeps_first_seen_bucket_order() {
        let mut p = Partition::new();
        p.push(ForecastCategory::Possible, record("Coogee"));
        p.push(ForecastCategory::Unlikely, record("Bondi Beach"));
        p.push(ForecastCategory::Possible, record("Maroubra"));

        let order: Vec<_> = p.iter().map(|(c, _)| c).collect();
        assert_eq!(
            order,
            vec![ForecastCategory::Possible, ForecastCategory::Unlikely]
        );
        let possible = p.get(ForecastCategory::Possible).unwrap();
        assert_eq!(possible[0].site_name, "Coogee");
        assert_eq!(possible[1].site_name, "Maroubra");
    }

    #[test]
    fn default_style_map_covers_all_categories() {
        let styles = StyleMap::default();
        for c in [
            ForecastCategory::Likely,
            ForecastCategory::Possible,
            ForecastCategory::Unlikely,
        ] {
            assert!(styles.get(c).is_some());
        }
        assert_eq!(styles.get(ForecastCategory::Unlikely).unwrap().glyph, "✅");
    }
}
