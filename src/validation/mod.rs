pub mod bounds;
pub mod schema;

pub use bounds::*;
pub use schema::*;
