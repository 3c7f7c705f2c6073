pub mod analysis;

pub use analysis::histogram::*;
pub use analysis::statistics::*;
pub use analysis::ticks::*;
