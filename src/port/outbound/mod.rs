pub mod artifacts;
pub mod cluster;
pub mod executor;
pub mod metadata;
