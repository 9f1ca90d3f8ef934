//! HTTP adapters for the admin REST API.

mod client;

pub use client::AdminClient;
