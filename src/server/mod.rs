// Server module entry point
// Provides listener creation, the accept loop, and signal-driven shutdown

pub mod connection;
pub mod listener;
pub mod shutdown;

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::Notify;

use crate::config::AppState;
use crate::logger;

// Re-export commonly used items
pub use listener::create_listener;
pub use shutdown::start_signal_handler;

/// Accept connections until a shutdown signal arrives.
///
/// Each accepted connection runs on its own spawned task; in-flight
/// requests finish naturally after the loop exits.
pub async fn run(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: Arc<Notify>,
) -> Result<(), Box<dyn std::error::Error>> {
    let active_connections = Arc::new(AtomicUsize::new(0));

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        connection::accept_connection(
                            stream,
                            peer_addr,
                            &state,
                            &active_connections,
                        );
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = shutdown.notified() => {
                break;
            }
        }
    }

    Ok(())
}
