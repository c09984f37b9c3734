pub mod converter;
pub mod cross_check;
pub mod direction;

pub use crate::domain::model::{BackendKind, Coordinate, Direction, DirectionMode, DiscrepancyReport};
pub use crate::domain::ports::{ConfigProvider, ConversionBackend};
pub use crate::utils::error::Result;
