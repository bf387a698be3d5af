//! Hardware access for the embedded target.

pub mod light;
