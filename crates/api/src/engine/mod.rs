//! Orchestration for pushing templates into external systems.

pub mod export;
