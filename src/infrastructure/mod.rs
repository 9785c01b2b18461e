//! Infrastructure layer.
//!
//! Provides technical concerns that support the application without containing
//! business logic. This layer handles configuration, logging and the wiring
//! of adapters into use cases.
//!
//! # Submodules
//!
//! - [`bootstrap`] - Composition root for adapter wiring
//! - [`config`] - Configuration loading and validation

pub mod bootstrap;
pub mod config;
