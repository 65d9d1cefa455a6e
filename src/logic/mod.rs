pub mod bom;
pub mod catalog_query;
pub mod expand;
pub mod merchandising;

pub use bom::*;
pub use catalog_query::*;
pub use expand::*;
pub use merchandising::*;
