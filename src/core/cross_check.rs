//! Compares the local and REST backends on random points in Switzerland.

use crate::core::converter::Converter;
use crate::domain::model::{BackendKind, Coordinate, Direction, DiscrepancyReport};
use crate::domain::ports::ConversionBackend;
use crate::utils::error::Result;
use rand::Rng;

/// WGS84 sampling box, roughly Switzerland.
pub const SAMPLE_LONGITUDE_RANGE: (f64, f64) = (6.0, 10.0);
pub const SAMPLE_LATITUDE_RANGE: (f64, f64) = (46.0, 47.0);

/// Observed backend disagreement is about 1 cm.
pub const DEFAULT_TOLERANCE_M: f64 = 0.05;

/// Length of one degree of arc on a sphere of mean earth radius.
const METRES_PER_DEGREE: f64 = 111_195.0;

pub fn sample_points<G: Rng + ?Sized>(n: usize, rng: &mut G) -> Vec<Coordinate> {
    (0..n)
        .map(|_| {
            Coordinate::new(
                rng.gen_range(SAMPLE_LONGITUDE_RANGE.0..=SAMPLE_LONGITUDE_RANGE.1),
                rng.gen_range(SAMPLE_LATITUDE_RANGE.0..=SAMPLE_LATITUDE_RANGE.1),
            )
        })
        .collect()
}

/// Approximate ground distance between two nearby lon/lat points.
pub fn degrees_to_ground_metres(a: &Coordinate, b: &Coordinate) -> f64 {
    let mean_lat = ((a.y + b.y) / 2.0).to_radians();
    let dx = (a.x - b.x) * mean_lat.cos() * METRES_PER_DEGREE;
    let dy = (a.y - b.y) * METRES_PER_DEGREE;
    dx.hypot(dy)
}

impl<L: ConversionBackend, R: ConversionBackend> Converter<L, R> {
    /// Samples `n` points and reports how far the two backends disagree.
    ///
    /// Points that fail in either backend are logged and skipped, so the
    /// result can be shorter than `n`.
    pub async fn check_conversion(&self, n: usize) -> Vec<DiscrepancyReport> {
        let points = sample_points(n, &mut rand::thread_rng());
        self.check_points(&points).await
    }

    pub async fn check_conversion_with_rng<G: Rng + ?Sized>(
        &self,
        n: usize,
        rng: &mut G,
    ) -> Vec<DiscrepancyReport> {
        let points = sample_points(n, rng);
        self.check_points(&points).await
    }

    pub async fn check_points(&self, points: &[Coordinate]) -> Vec<DiscrepancyReport> {
        let mut reports = Vec::with_capacity(points.len());

        for (i, point) in points.iter().enumerate() {
            match self.check_point(*point).await {
                Ok(report) => {
                    tracing::debug!(
                        "Point {} ({}): forward {:.4} m, inverse {:.4} m",
                        i,
                        point,
                        report.forward_m,
                        report.inverse_m
                    );
                    reports.push(report);
                }
                Err(e) => {
                    tracing::warn!("Skipping point {} ({}) [{}]: {}", i, point, e.stage(), e);
                }
            }
        }

        tracing::info!("Cross-checked {}/{} point(s)", reports.len(), points.len());
        reports
    }

    async fn check_point(&self, wgs84: Coordinate) -> Result<DiscrepancyReport> {
        let local = self.backend(BackendKind::Local);
        let rest = self.backend(BackendKind::Rest);

        // The local result doubles as the LV03 test point.
        let lv03 = local.convert_point(wgs84, Direction::Wgs84ToLv03).await?;
        let rest_to_lv03 = rest.convert_point(wgs84, Direction::Wgs84ToLv03).await?;
        let local_to_wgs84 = local.convert_point(lv03, Direction::Lv03ToWgs84).await?;
        let rest_to_wgs84 = rest.convert_point(lv03, Direction::Lv03ToWgs84).await?;

        Ok(DiscrepancyReport {
            wgs84,
            lv03,
            local_to_lv03: lv03,
            rest_to_lv03,
            local_to_wgs84,
            rest_to_wgs84,
            forward_m: lv03.distance_to(&rest_to_lv03),
            inverse_deg: local_to_wgs84.distance_to(&rest_to_wgs84),
            inverse_m: degrees_to_ground_metres(&local_to_wgs84, &rest_to_wgs84),
        })
    }
}
