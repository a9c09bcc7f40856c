//! DraftKings module - snapshot and live odds clients for the DraftKings sportsbook

pub mod client;
pub mod filter;
pub mod leagues;
pub mod messages;
pub mod rest;
pub mod websocket;

pub use client::DraftKingsClient;
