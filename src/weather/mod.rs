//! Weather telemetry core: validation, rain totalization, downsampling,
//! aggregation and export. Everything here is pure logic; durability lives
//! in the storage layer.

pub mod downsample;
pub mod export;
pub mod range;
pub mod stats;
pub mod totalizer;
pub mod validator;

pub use downsample::downsample;
pub use export::ExportFormat;
pub use range::Range;
pub use stats::{aggregate, WeatherStats};
pub use validator::{validate, ValidationOutcome};
