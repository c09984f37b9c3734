use crate::domain::model::{Coordinate, Direction};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;

/// One way of turning a point into the other frame.
#[async_trait]
pub trait ConversionBackend: Send + Sync {
    fn name(&self) -> &'static str;

    async fn convert_point(&self, point: Coordinate, direction: Direction) -> Result<Coordinate>;
}

pub trait ConfigProvider: Send + Sync {
    fn grid_url(&self) -> &str;
    /// Where a downloaded grid is written.
    fn grid_local_path(&self) -> PathBuf;
    /// Directories searched for an existing grid, in order.
    fn grid_search_paths(&self) -> Vec<PathBuf>;
    fn rest_endpoint(&self) -> &str;
    fn rest_timeout(&self) -> Duration;
}
