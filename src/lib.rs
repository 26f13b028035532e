//! Terminal esports aptitude assessment.
//!
//! A run walks the player through a fixed [`catalog`] of levels and tests.
//! Each test is a small interactive game from [`games`]; its single result is
//! recorded by [`session::controller::SessionController`], which drives the
//! pure state machine in [`session::state`] and pushes scores through a
//! [`store::gateway::ScoreGateway`]. The binary in `main.rs` owns the terminal.

pub mod app;
pub mod catalog;
pub mod config;
pub mod event;
pub mod games;
pub mod logging;
pub mod report;
pub mod session;
pub mod store;
pub mod ui;
