//! Core Module - Assessment Pipeline
//!
//! Geographic modulation, sub-score calculation, rating classification,
//! risk factor derivation and result assembly, plus the engine that runs
//! them in order.

pub mod assembler;
pub mod engine;
pub mod modulator;
pub mod rating;
pub mod risk_factors;
pub mod scoring;

pub use assembler::*;
pub use engine::*;
pub use modulator::*;
pub use rating::*;
pub use risk_factors::*;
pub use scoring::*;
