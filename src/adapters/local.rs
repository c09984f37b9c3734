//! PROJ-backed conversion using swisstopo's CHENyx06 shift grid.

use crate::adapters::grid::GridProvisioner;
use crate::domain::model::{Coordinate, Direction};
use crate::domain::ports::ConversionBackend;
use crate::utils::error::{ReframeError, Result};
use async_trait::async_trait;
use proj::Proj;
use std::cell::RefCell;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::OnceCell;

/// Swiss oblique Mercator on the Bessel ellipsoid, the LV03 projection.
pub const LV03_PROJECTION: &str = "+proj=somerc +lat_0=46.95240555555556 +lon_0=7.439583333333333 \
    +k_0=1 +x_0=600000 +y_0=200000 +ellps=bessel +units=m";

/// PROJ pipeline for one direction. The grid shifts CH1903 lon/lat onto
/// ETRS89, which is treated as WGS84.
///
/// `grid` should be absolute; it is quoted so whitespace in the path survives.
pub fn pipeline_definition(grid: &Path, direction: Direction) -> String {
    let grid = grid.display();
    match direction {
        Direction::Wgs84ToLv03 => format!(
            "+proj=pipeline \
             +step +proj=unitconvert +xy_in=deg +xy_out=rad \
             +step +inv +proj=hgridshift +grids=\"{grid}\" \
             +step {LV03_PROJECTION}"
        ),
        Direction::Lv03ToWgs84 => format!(
            "+proj=pipeline \
             +step +inv {LV03_PROJECTION} \
             +step +proj=hgridshift +grids=\"{grid}\" \
             +step +proj=unitconvert +xy_in=rad +xy_out=deg"
        ),
    }
}

type GridOutcome = std::result::Result<PathBuf, (String, String)>;

pub struct LocalBackend {
    provisioner: GridProvisioner,
    grid: OnceCell<GridOutcome>,
}

impl LocalBackend {
    pub fn new(provisioner: GridProvisioner) -> Self {
        Self {
            provisioner,
            grid: OnceCell::new(),
        }
    }

    /// Resolves the grid on first use. The outcome, failure included, is kept
    /// for the lifetime of the backend.
    pub async fn grid_path(&self) -> Result<PathBuf> {
        let outcome = self
            .grid
            .get_or_init(|| async {
                self.provisioner
                    .ensure_available()
                    .await
                    .map_err(|e| match e {
                        ReframeError::ResourceUnavailable { resource, reason } => (resource, reason),
                        other => (
                            format!("shift grid {}", self.provisioner.local_path().display()),
                            other.to_string(),
                        ),
                    })
            })
            .await;

        outcome
            .clone()
            .map_err(|(resource, reason)| ReframeError::ResourceUnavailable { resource, reason })
    }
}

thread_local! {
    // Proj 不是 Send，每條執行緒各自保留建好的 pipeline
    static PIPELINES: RefCell<HashMap<(PathBuf, Direction), Proj>> = RefCell::new(HashMap::new());
}

fn build_pipeline(grid: &Path, direction: Direction) -> Result<Proj> {
    tracing::debug!("Building {} pipeline with grid {}", direction, grid.display());
    Proj::new(&pipeline_definition(grid, direction)).map_err(|e| ReframeError::ConversionError {
        message: format!("cannot build {} pipeline with grid {}: {}", direction, grid.display(), e),
    })
}

#[cfg(test)]
fn cached_pipelines() -> usize {
    PIPELINES.with(|cache| cache.borrow().len())
}

fn project(grid: &Path, point: Coordinate, direction: Direction) -> Result<Coordinate> {
    let (x, y) = PIPELINES.with(|cache| -> Result<(f64, f64)> {
        let mut cache = cache.borrow_mut();
        let key = (grid.to_path_buf(), direction);
        let proj = match cache.entry(key) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                entry.insert(build_pipeline(grid, direction)?)
            }
        };

        proj.convert((point.x, point.y))
            .map_err(|e| ReframeError::ConversionError {
                message: format!("{} failed for ({}): {}", direction, point, e),
            })
    })?;

    if !x.is_finite() || !y.is_finite() {
        return Err(ReframeError::ConversionError {
            message: format!("{} gave no result for ({}), outside the grid?", direction, point),
        });
    }

    Ok(Coordinate::new(x, y))
}

#[async_trait]
impl ConversionBackend for LocalBackend {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn convert_point(&self, point: Coordinate, direction: Direction) -> Result<Coordinate> {
        let grid = self.grid_path().await?;
        project(&grid, point, direction)
    }
}
