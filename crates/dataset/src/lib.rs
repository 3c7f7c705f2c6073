pub mod csv;
pub mod dataset;
pub mod ids;
pub mod prepare;
pub mod row;

// Dataset crate: immutable survey rows and the loaders that produce them.
pub use dataset::*;
pub use ids::*;
pub use row::*;
