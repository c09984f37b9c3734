use crate::domain::model::{Coordinate, DiscrepancyReport};
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

#[derive(Debug, Deserialize)]
struct PointRow {
    x: f64,
    y: f64,
}

#[derive(Debug, Serialize)]
struct ConversionRow {
    x: f64,
    y: f64,
    out_x: f64,
    out_y: f64,
}

#[derive(Debug, Serialize)]
struct ReportRow {
    lon: f64,
    lat: f64,
    easting: f64,
    northing: f64,
    local_easting: f64,
    local_northing: f64,
    rest_easting: f64,
    rest_northing: f64,
    local_lon: f64,
    local_lat: f64,
    rest_lon: f64,
    rest_lat: f64,
    forward_m: f64,
    inverse_deg: f64,
    inverse_m: f64,
}

impl From<&DiscrepancyReport> for ReportRow {
    fn from(r: &DiscrepancyReport) -> Self {
        Self {
            lon: r.wgs84.x,
            lat: r.wgs84.y,
            easting: r.lv03.x,
            northing: r.lv03.y,
            local_easting: r.local_to_lv03.x,
            local_northing: r.local_to_lv03.y,
            rest_easting: r.rest_to_lv03.x,
            rest_northing: r.rest_to_lv03.y,
            local_lon: r.local_to_wgs84.x,
            local_lat: r.local_to_wgs84.y,
            rest_lon: r.rest_to_wgs84.x,
            rest_lat: r.rest_to_wgs84.y,
            forward_m: r.forward_m,
            inverse_deg: r.inverse_deg,
            inverse_m: r.inverse_m,
        }
    }
}

/// Reads points from CSV with an `x,y` header.
pub fn read_points<R: Read>(reader: R) -> Result<Vec<Coordinate>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut points = Vec::new();
    for row in rdr.deserialize::<PointRow>() {
        let row = row?;
        points.push(Coordinate::new(row.x, row.y));
    }
    Ok(points)
}

pub fn write_conversions<W: Write>(
    writer: W,
    inputs: &[Coordinate],
    outputs: &[Coordinate],
) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for (input, output) in inputs.iter().zip(outputs) {
        wtr.serialize(ConversionRow {
            x: input.x,
            y: input.y,
            out_x: output.x,
            out_y: output.y,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_reports<W: Write>(writer: W, reports: &[DiscrepancyReport]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for report in reports {
        wtr.serialize(ReportRow::from(report))?;
    }
    wtr.flush()?;
    Ok(())
}
