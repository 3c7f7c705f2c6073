pub mod histogram;
pub mod statistics;
pub mod ticks;
