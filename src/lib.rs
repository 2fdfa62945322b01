//! Gerstner cascades - Multi-resolution Gerstner ocean wave synthesis

pub mod cascade;
pub mod cli;
pub mod error;
pub mod ocean;
pub mod params;
pub mod phase;
pub mod spectrum;
