pub mod document;
pub mod infrastructure;
pub mod params;
pub mod record;
pub mod time;

pub use document::*;
pub use infrastructure::*;
pub use params::*;
pub use record::{EnrichedRecord, RawRow, ServiceRecord};
