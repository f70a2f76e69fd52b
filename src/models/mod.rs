mod reading;

pub use reading::{IngestRequest, NewReading, RainState, Reading};
