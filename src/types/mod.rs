//! Type definitions

pub mod error;
pub mod geo;
pub mod messages;
pub mod route;
pub mod stop;

pub use error::*;
pub use geo::*;
pub use messages::*;
pub use route::*;
pub use stop::*;
