pub mod choropleth;
pub mod config;
pub mod distribution;
pub mod legend;
pub mod scale;
pub mod symbology;

pub use choropleth::*;
pub use config::*;
pub use distribution::*;
pub use legend::*;
pub use scale::*;
pub use symbology::*;
