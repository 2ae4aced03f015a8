//! Static file server with html-mode directory resolution.
//!
//! The core is [`resolver::StaticResolver`], which maps request paths to
//! files under a single serving root with path-escape prevention and
//! index-file fallback. The surrounding modules wire it into a tokio/hyper
//! HTTP front end with configuration, access logging, and graceful shutdown.

pub mod config;
pub mod handler;
pub mod http;
pub mod logger;
pub mod resolver;
pub mod server;
