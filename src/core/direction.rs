//! Magnitude-based frame detection.
//!
//! LV03 values are six-digit metres, WGS84 values are small degrees, so the
//! frame of an untagged pair can be read off its size. Pairs that fit neither
//! pattern are reported as [`Classification::Ambiguous`] instead of guessed.

use crate::domain::model::{Classification, Coordinate, Direction, Frame};
use crate::utils::error::{ReframeError, Result};

/// Above this absolute value a coordinate is taken to be LV03 metres.
pub const LV03_MAGNITUDE_THRESHOLD: f64 = 1000.0;

pub const WGS84_MAX_LONGITUDE: f64 = 180.0;
pub const WGS84_MAX_LATITUDE: f64 = 90.0;

/// Swiss extent in LV03 (easting, northing), metres.
pub const LV03_EASTING_RANGE: (f64, f64) = (485_000.0, 834_000.0);
pub const LV03_NORTHING_RANGE: (f64, f64) = (75_000.0, 296_000.0);

/// Swiss extent in WGS84 (longitude, latitude), degrees.
pub const WGS84_LONGITUDE_RANGE: (f64, f64) = (5.9, 10.5);
pub const WGS84_LATITUDE_RANGE: (f64, f64) = (45.8, 47.8);

pub fn classify(point: &Coordinate) -> Classification {
    classify_magnitudes(point.x.abs(), point.y.abs())
}

fn classify_magnitudes(ax: f64, ay: f64) -> Classification {
    if !ax.is_finite() || !ay.is_finite() {
        return Classification::Ambiguous;
    }
    if ax > LV03_MAGNITUDE_THRESHOLD || ay > LV03_MAGNITUDE_THRESHOLD {
        Classification::Lv03
    } else if ax <= WGS84_MAX_LONGITUDE && ay <= WGS84_MAX_LATITUDE {
        Classification::Wgs84
    } else {
        Classification::Ambiguous
    }
}

fn direction_for(classification: Classification, point: &Coordinate) -> Result<Direction> {
    match classification {
        Classification::Lv03 => Ok(Direction::Lv03ToWgs84),
        Classification::Wgs84 => Ok(Direction::Wgs84ToLv03),
        Classification::Ambiguous => Err(ReframeError::AmbiguousDirection {
            x: point.x,
            y: point.y,
        }),
    }
}

pub fn detect_direction(point: &Coordinate) -> Result<Direction> {
    let classification = classify(point);
    if let Some(frame) = classification.frame() {
        if !is_within_swiss_extent(point, frame) {
            tracing::debug!("({}) looks like {} but lies outside Switzerland", point, frame);
        }
    }
    direction_for(classification, point)
}

/// Classifies a whole batch by its largest magnitude on each axis.
///
/// One LV03-sized value anywhere makes the whole batch LV03. Returns
/// `Ok(None)` for an empty batch.
pub fn detect_batch_direction(points: &[Coordinate]) -> Result<Option<Direction>> {
    if points.is_empty() {
        return Ok(None);
    }

    // f64::max 會吞掉 NaN，先把非有限值挑出來
    if let Some(bad) = points.iter().find(|p| !p.x.is_finite() || !p.y.is_finite()) {
        return direction_for(Classification::Ambiguous, bad).map(Some);
    }

    let (max_x, max_y) = points.iter().fold((0.0_f64, 0.0_f64), |(mx, my), p| {
        (mx.max(p.x.abs()), my.max(p.y.abs()))
    });

    let summary = Coordinate::new(max_x, max_y);
    direction_for(classify_magnitudes(max_x, max_y), &summary).map(Some)
}

pub fn is_within_swiss_extent(point: &Coordinate, frame: Frame) -> bool {
    let (x_range, y_range) = match frame {
        Frame::Lv03 => (LV03_EASTING_RANGE, LV03_NORTHING_RANGE),
        Frame::Wgs84 => (WGS84_LONGITUDE_RANGE, WGS84_LATITUDE_RANGE),
    };
    (x_range.0..=x_range.1).contains(&point.x) && (y_range.0..=y_range.1).contains(&point.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_swiss_points() {
        assert_eq!(classify(&Coordinate::new(600_000.0, 200_000.0)), Classification::Lv03);
        assert_eq!(classify(&Coordinate::new(7.43861, 46.951)), Classification::Wgs84);
        assert_eq!(classify(&Coordinate::new(8.55, 47.37)), Classification::Wgs84);
    }

    #[test]
    fn test_one_large_axis_is_enough() {
        assert_eq!(classify(&Coordinate::new(7.0, 200_000.0)), Classification::Lv03);
        assert_eq!(classify(&Coordinate::new(-1500.0, 3.0)), Classification::Lv03);
    }

    #[test]
    fn test_ambiguous_band() {
        assert_eq!(classify(&Coordinate::new(500.0, 10.0)), Classification::Ambiguous);
        assert_eq!(classify(&Coordinate::new(10.0, 95.0)), Classification::Ambiguous);
        assert_eq!(classify(&Coordinate::new(f64::NAN, 46.0)), Classification::Ambiguous);
        assert_eq!(
            classify(&Coordinate::new(f64::INFINITY, 46.0)),
            Classification::Ambiguous
        );
    }

    #[test]
    fn test_threshold_is_exclusive() {
        assert_eq!(
            classify(&Coordinate::new(LV03_MAGNITUDE_THRESHOLD, 0.0)),
            Classification::Ambiguous
        );
        assert_eq!(
            classify(&Coordinate::new(LV03_MAGNITUDE_THRESHOLD + 0.001, 0.0)),
            Classification::Lv03
        );
    }

    #[test]
    fn test_detect_direction() {
        assert_eq!(
            detect_direction(&Coordinate::new(683_940.63, 247_167.56)).unwrap(),
            Direction::Lv03ToWgs84
        );
        assert_eq!(
            detect_direction(&Coordinate::new(8.55, 47.37)).unwrap(),
            Direction::Wgs84ToLv03
        );

        let err = detect_direction(&Coordinate::new(500.0, 500.0)).unwrap_err();
        assert!(matches!(err, ReframeError::AmbiguousDirection { .. }));
    }

    #[test]
    fn test_detection_is_stable_across_frames() {
        // A converted point must classify as the frame it was converted into.
        let pairs = [
            (Coordinate::new(7.43861, 46.951), Coordinate::new(599_998.21, 199_990.73)),
            (Coordinate::new(8.55, 47.37), Coordinate::new(683_940.63, 247_167.56)),
        ];
        for (wgs84, lv03) in pairs {
            let forward = detect_direction(&wgs84).unwrap();
            let backward = detect_direction(&lv03).unwrap();
            assert_eq!(forward.inverse(), backward);
            assert_eq!(detect_direction(&wgs84).unwrap(), forward);
        }
    }

    #[test]
    fn test_batch_direction() {
        assert_eq!(detect_batch_direction(&[]).unwrap(), None);

        let mixed = [Coordinate::new(7.4, 46.9), Coordinate::new(600_000.0, 200_000.0)];
        assert_eq!(
            detect_batch_direction(&mixed).unwrap(),
            Some(Direction::Lv03ToWgs84)
        );

        let wgs = [Coordinate::new(7.4, 46.9), Coordinate::new(-8.5, -47.3)];
        assert_eq!(detect_batch_direction(&wgs).unwrap(), Some(Direction::Wgs84ToLv03));

        let bad = [Coordinate::new(7.4, 46.9), Coordinate::new(7.4, f64::NAN)];
        assert!(detect_batch_direction(&bad).is_err());
    }

    #[test]
    fn test_swiss_extent() {
        assert!(is_within_swiss_extent(&Coordinate::new(7.44, 46.95), Frame::Wgs84));
        assert!(!is_within_swiss_extent(&Coordinate::new(2.35, 48.85), Frame::Wgs84));
        assert!(is_within_swiss_extent(&Coordinate::new(600_000.0, 200_000.0), Frame::Lv03));
        assert!(!is_within_swiss_extent(&Coordinate::new(900_000.0, 200_000.0), Frame::Lv03));
    }
}
