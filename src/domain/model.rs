use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An untagged coordinate pair.
///
/// `x`/`y` are easting/northing in metres for LV03 and longitude/latitude in
/// degrees for WGS84. The frame is inferred from magnitude, see
/// [`crate::core::direction`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

impl Coordinate {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl From<Coordinate> for (f64, f64) {
    fn from(c: Coordinate) -> Self {
        (c.x, c.y)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

impl FromStr for Coordinate {
    type Err = String;

    /// Parses `"x,y"`, whitespace around either number is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| format!("expected 'x,y', got '{}'", s))?;
        let x = x
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("bad x in '{}': {}", s, e))?;
        let y = y
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("bad y in '{}': {}", s, e))?;
        Ok(Self { x, y })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Frame {
    Lv03,
    Wgs84,
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frame::Lv03 => write!(f, "LV03"),
            Frame::Wgs84 => write!(f, "WGS84"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Lv03ToWgs84,
    Wgs84ToLv03,
}

impl Direction {
    pub fn source(&self) -> Frame {
        match self {
            Direction::Lv03ToWgs84 => Frame::Lv03,
            Direction::Wgs84ToLv03 => Frame::Wgs84,
        }
    }

    pub fn target(&self) -> Frame {
        match self {
            Direction::Lv03ToWgs84 => Frame::Wgs84,
            Direction::Wgs84ToLv03 => Frame::Lv03,
        }
    }

    pub fn inverse(&self) -> Direction {
        match self {
            Direction::Lv03ToWgs84 => Direction::Wgs84ToLv03,
            Direction::Wgs84ToLv03 => Direction::Lv03ToWgs84,
        }
    }

    /// Path segment used by the swisstopo REFRAME service.
    pub fn service_path(&self) -> &'static str {
        match self {
            Direction::Lv03ToWgs84 => "lv03towgs84",
            Direction::Wgs84ToLv03 => "wgs84tolv03",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.source(), self.target())
    }
}

/// Outcome of classifying a pair by magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Lv03,
    Wgs84,
    Ambiguous,
}

impl Classification {
    pub fn frame(&self) -> Option<Frame> {
        match self {
            Classification::Lv03 => Some(Frame::Lv03),
            Classification::Wgs84 => Some(Frame::Wgs84),
            Classification::Ambiguous => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// PROJ with the CHENyx06 grid
    #[default]
    Local,
    /// swisstopo REFRAME web service
    Rest,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Local => write!(f, "local"),
            BackendKind::Rest => write!(f, "rest"),
        }
    }
}

/// Whether the facade classifies each point on its own or the batch as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum DirectionMode {
    #[default]
    PerPoint,
    PerBatch,
}

/// Result of pushing one sampled point through both backends.
#[derive(Debug, Clone, Serialize)]
pub struct DiscrepancyReport {
    pub wgs84: Coordinate,
    pub lv03: Coordinate,
    pub local_to_lv03: Coordinate,
    pub rest_to_lv03: Coordinate,
    pub local_to_wgs84: Coordinate,
    pub rest_to_wgs84: Coordinate,
    /// WGS84 -> LV03, distance between backends in metres.
    pub forward_m: f64,
    /// LV03 -> WGS84, distance between backends in degrees.
    pub inverse_deg: f64,
    /// `inverse_deg` scaled to metres on the ground.
    pub inverse_m: f64,
}

impl DiscrepancyReport {
    /// Worst of both directions, in metres. A non-finite distance counts
    /// as infinitely far off.
    pub fn discrepancy_m(&self) -> f64 {
        if !self.forward_m.is_finite() || !self.inverse_m.is_finite() {
            return f64::INFINITY;
        }
        self.forward_m.max(self.inverse_m)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DiscrepancySummary {
    pub requested: usize,
    pub completed: usize,
    pub skipped: usize,
    pub max_m: f64,
    pub mean_m: f64,
    pub generated_at: DateTime<Utc>,
}

impl DiscrepancySummary {
    pub fn from_reports(requested: usize, reports: &[DiscrepancyReport]) -> Self {
        let completed = reports.len();
        let max_m = reports
            .iter()
            .map(DiscrepancyReport::discrepancy_m)
            .fold(0.0, f64::max);
        let mean_m = if completed == 0 {
            0.0
        } else {
            reports.iter().map(DiscrepancyReport::discrepancy_m).sum::<f64>() / completed as f64
        };

        Self {
            requested,
            completed,
            skipped: requested.saturating_sub(completed),
            max_m,
            mean_m,
            generated_at: Utc::now(),
        }
    }

    pub fn within_tolerance(&self, limit_m: f64) -> bool {
        self.max_m.is_finite() && self.max_m <= limit_m
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(forward_m: f64, inverse_m: f64) -> DiscrepancyReport {
        let c = Coordinate::new(0.0, 0.0);
        DiscrepancyReport {
            wgs84: c,
            lv03: c,
            local_to_lv03: c,
            rest_to_lv03: c,
            local_to_wgs84: c,
            rest_to_wgs84: c,
            forward_m,
            inverse_deg: 0.0,
            inverse_m,
        }
    }

    #[test]
    fn test_parse_coordinate() {
        let c: Coordinate = "7.43861, 46.951".parse().unwrap();
        assert_eq!(c, Coordinate::new(7.43861, 46.951));
        assert!("600000".parse::<Coordinate>().is_err());
        assert!("a,b".parse::<Coordinate>().is_err());
    }

    #[test]
    fn test_direction_paths() {
        assert_eq!(Direction::Lv03ToWgs84.service_path(), "lv03towgs84");
        assert_eq!(Direction::Wgs84ToLv03.service_path(), "wgs84tolv03");
        assert_eq!(Direction::Wgs84ToLv03.inverse(), Direction::Lv03ToWgs84);
        assert_eq!(Direction::Wgs84ToLv03.target(), Frame::Lv03);
    }

    #[test]
    fn test_summary() {
        let reports = vec![report(0.01, 0.002), report(0.004, 0.02)];
        let summary = DiscrepancySummary::from_reports(3, &reports);

        assert_eq!(summary.completed, 2);
        assert_eq!(summary.skipped, 1);
        assert!((summary.max_m - 0.02).abs() < 1e-12);
        assert!((summary.mean_m - 0.015).abs() < 1e-12);
        assert!(summary.within_tolerance(0.05));
        assert!(!summary.within_tolerance(0.01));
    }

    #[test]
    fn test_nan_distance_breaks_tolerance() {
        let broken = report(f64::NAN, 0.0);
        assert_eq!(broken.discrepancy_m(), f64::INFINITY);

        let summary = DiscrepancySummary::from_reports(2, &[report(0.01, 0.01), broken]);
        assert_eq!(summary.max_m, f64::INFINITY);
        assert!(!summary.within_tolerance(0.05));

        let summary = DiscrepancySummary::from_reports(1, &[report(0.0, f64::INFINITY)]);
        assert!(!summary.within_tolerance(0.05));
    }

    #[test]
    fn test_empty_summary() {
        let summary = DiscrepancySummary::from_reports(0, &[]);
        assert_eq!(summary.max_m, 0.0);
        assert_eq!(summary.mean_m, 0.0);
    }
}
