// Application state module
// Immutable state shared across connection tasks

use std::io;

use super::types::Config;
use crate::resolver::StaticResolver;

/// Application state
///
/// Built once at startup and shared behind an `Arc`. Nothing in here
/// mutates after construction, so connection tasks need no locking.
pub struct AppState {
    pub config: Config,
    pub resolver: StaticResolver,
}

impl AppState {
    /// Create `AppState`, binding the resolver to the configured root.
    ///
    /// Fails when the root directory does not exist; a server confined to
    /// a missing directory has nothing to serve.
    pub fn new(config: Config) -> io::Result<Self> {
        let resolver = StaticResolver::new(
            &config.static_files.root,
            config.static_files.index_files.clone(),
            config.static_files.redirect_to_slash,
        )?;

        Ok(Self { config, resolver })
    }
}
