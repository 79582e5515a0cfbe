//! TUI widgets for the channel display.
//!
//! - [`BipolarMeter`]: bar centred on zero for values in `[-1, +1]`
//!
//! All widgets implement the ratatui `Widget` trait for rendering.

pub mod meter;

pub use meter::BipolarMeter;
