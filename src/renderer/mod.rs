//! GPU rendering module.

pub mod gpu;
