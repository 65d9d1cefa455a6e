pub mod asset;
pub mod bom;
pub mod common;
pub mod instance;
pub mod merchandising;
pub mod project;

pub use asset::*;
pub use bom::*;
pub use common::*;
pub use instance::*;
pub use merchandising::*;
pub use project::*;
