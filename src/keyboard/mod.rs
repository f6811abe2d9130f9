pub mod display;
pub mod frame;

pub use frame::{KeyGroup, KeystrokeFrame};
