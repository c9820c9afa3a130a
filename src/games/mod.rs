//! Reference game implementations.
//!
//! These serve as:
//! - Test cases for the engine
//! - Examples for implementing new games
//! - Benchmarks for stepping performance

pub mod bidding;
