//! Headless autoplay runner for the colony simulation.
//!
//! This crate drives [`exodus_core`] sessions without a human at the
//! keyboard:
//!
//! - **Autoplay**: a scripted [`Strategy`] plans each day's commands
//! - **Batch runs**: many seeds in parallel for balance testing
//! - **Validation**: check rule files before shipping them
//!
//! # Output
//!
//! - **stdout**: day reports, as text or JSON lines
//! - **stderr**: logs (human-readable)
//!
//! See the [`presenter`] module for the JSON line format.
//!
//! # Example
//!
//! ```bash
//! # Play one game and print every day
//! cargo run -p exodus_cli -- run --seed 7 --max-days 120
//!
//! # Balance run over 500 seeds
//! cargo run -p exodus_cli -- batch --count 500 --seed 0
//!
//! # Check a rules file
//! cargo run -p exodus_cli -- validate assets/rules/harsh.ron
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod batch;
pub mod presenter;
pub mod runner;
pub mod strategy;

pub use batch::{run_batch, BatchConfig, BatchResults, BatchSummary};
pub use presenter::{Format, Presenter, Report};
pub use runner::{play, GameRecord};
pub use strategy::{Strategy, StrategyError};
