pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{GridProvisioner, LocalBackend, RestBackend};
pub use config::ConverterConfig;
pub use core::converter::Converter;
pub use domain::model::{BackendKind, Coordinate, Direction, DirectionMode, DiscrepancyReport, DiscrepancySummary};
pub use utils::error::{ReframeError, Result};
