//! Inbound adapters driving the use cases.

pub mod cli;
