//! Hosted blockchain API: transport, routes, KMS queue and utilities

mod client;
pub mod endpoints;
mod kms;
mod services;

pub use client::{HostedApi, HttpHostedApi};
pub use endpoints::ApiOperation;
pub use kms::*;
pub use services::*;
