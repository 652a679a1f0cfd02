//! linktrack - link redirection and conversion attribution tracker
//!
//! Registers tracking codes for outbound links sent by agents, redirects and
//! logs every visit, attributes conversion webhooks to the contact's most
//! recently clicked link, and serves aggregate stats.
//!
//! # Architecture
//! - `storage`: SeaORM-backed persistence for links, clicks and conversions
//! - `services`: registration, redirect, attribution and stats logic
//! - `api`: HTTP handlers and middleware
//! - `config`: static TOML / environment configuration
//! - `runtime`: application lifecycle and server mode
//! - `system`: logging setup

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
