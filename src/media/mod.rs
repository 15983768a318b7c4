//! Media measurement.

pub mod probe;

pub use probe::MediaAsset;
