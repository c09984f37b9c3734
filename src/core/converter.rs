use crate::adapters::{GridProvisioner, LocalBackend, RestBackend};
use crate::core::direction::{detect_batch_direction, detect_direction};
use crate::domain::model::{BackendKind, Coordinate, Direction, DirectionMode};
use crate::domain::ports::{ConfigProvider, ConversionBackend};
use crate::utils::error::Result;

/// Single entry point for converting batches of points.
///
/// Generic over both backends so tests can swap in fakes; production code
/// builds it with [`Converter::from_config`].
pub struct Converter<L: ConversionBackend, R: ConversionBackend> {
    local: L,
    rest: R,
    mode: DirectionMode,
}

impl Converter<LocalBackend, RestBackend> {
    pub fn from_config<C: ConfigProvider>(config: &C, mode: DirectionMode) -> Result<Self> {
        let local = LocalBackend::new(GridProvisioner::from_config(config));
        let rest = RestBackend::from_config(config)?;
        Ok(Self::new(local, rest, mode))
    }
}

impl<L: ConversionBackend, R: ConversionBackend> Converter<L, R> {
    pub fn new(local: L, rest: R, mode: DirectionMode) -> Self {
        Self { local, rest, mode }
    }

    pub fn mode(&self) -> DirectionMode {
        self.mode
    }

    pub fn backend(&self, kind: BackendKind) -> &dyn ConversionBackend {
        match kind {
            BackendKind::Local => &self.local,
            BackendKind::Rest => &self.rest,
        }
    }

    /// Converts every point into the other frame, detecting the source frame
    /// from magnitude. Output order matches input order; the first failing
    /// point aborts the batch.
    pub async fn convert(&self, points: &[Coordinate], kind: BackendKind) -> Result<Vec<Coordinate>> {
        let directions = match self.mode {
            DirectionMode::PerPoint => points
                .iter()
                .map(detect_direction)
                .collect::<Result<Vec<_>>>()?,
            DirectionMode::PerBatch => match detect_batch_direction(points)? {
                Some(direction) => vec![direction; points.len()],
                None => Vec::new(),
            },
        };

        let backend = self.backend(kind);
        tracing::debug!(
            "Converting {} point(s) with the {} backend ({:?})",
            points.len(),
            backend.name(),
            self.mode
        );

        let mut results = Vec::with_capacity(points.len());
        for (point, direction) in points.iter().zip(directions) {
            results.push(backend.convert_point(*point, direction).await?);
        }
        Ok(results)
    }

    /// Like [`Converter::convert`] but with a caller-chosen direction.
    pub async fn convert_in_direction(
        &self,
        points: &[Coordinate],
        direction: Direction,
        kind: BackendKind,
    ) -> Result<Vec<Coordinate>> {
        let backend = self.backend(kind);
        let mut results = Vec::with_capacity(points.len());
        for point in points {
            results.push(backend.convert_point(*point, direction).await?);
        }
        Ok(results)
    }
}
