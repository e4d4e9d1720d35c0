//! MCP (Model Context Protocol) server module.
//!
//! JSON-RPC 2.0 over STDIO exposing the service operations as tools.

pub mod server;
pub mod tools;
pub mod types;

pub use server::{run, serve};
