//! Mode routing
//!
//! `serve` runs the HTTP server; `config generate` is handled directly in
//! `main` and never reaches the runtime.

pub mod server;

pub use server::run_server;
