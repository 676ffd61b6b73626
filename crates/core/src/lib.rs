pub mod error;
pub mod model;
pub mod time;
pub mod traversal;

pub use error::Error;
pub use time::Clock;
