//! Core model for entity-relationship diagrams
//!
//! Tables own columns and the ports bound to them, links join two ports,
//! and the [`Diagram`] owns both and mediates every change.

mod diagram;
mod error;
mod events;
pub mod geometry;
mod link;
pub mod logging;
mod policy;
mod store;
mod table;
mod types;

pub use diagram::*;
pub use error::*;
pub use events::*;
pub use link::*;
pub use logging::*;
pub use policy::*;
pub use store::*;
pub use table::*;
pub use types::*;
