// Adapters layer: concrete implementations for external systems (grid download, PROJ, REST, CSV files).

pub mod csv_io;
pub mod grid;
pub mod local;
pub mod rest;

pub use grid::GridProvisioner;
pub use local::LocalBackend;
pub use rest::RestBackend;
