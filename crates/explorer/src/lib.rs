pub mod aggregate;
pub mod events;
pub mod filter;
pub mod selection;
pub mod state;

pub use aggregate::*;
pub use events::*;
pub use filter::*;
pub use selection::*;
pub use state::*;
