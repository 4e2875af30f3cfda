//! GPU interfaces

pub mod buffer;
