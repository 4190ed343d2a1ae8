//! Configuration models for the virtual clock.

pub mod clock;

pub use clock::VirtualClockConfig;
