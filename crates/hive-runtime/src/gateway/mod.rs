//! Network gateway.
//!
//! The gateway is the worker's public surface: a TCP listener started on
//! `APP_START` (unless the configuration disables the network) and
//! closed first on `APP_STOP`. Each accepted socket becomes one
//! [`ClientConnection`] on its own task; the accept loop itself lives on
//! a task owned by the [`Gateway`] handle, so shutting down is a matter
//! of signalling that task and waiting for it to finish.
//!
//! Binding `port: 0` asks the OS for an ephemeral port; the actual
//! address is available from [`Gateway::local_addr`] and is what the
//! worker registers in the peer directory.

mod connection;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::GatewayError;
use crate::responser::CallResponser;
use crate::streamer::CallStreamer;

pub use connection::ClientConnection;

/// Handle to a running listener.
///
/// Dropping the handle leaves the accept loop running detached; use
/// [`shutdown`](Self::shutdown) to close the listener deterministically.
#[derive(Debug)]
pub struct Gateway {
    local_addr: SocketAddr,
    shutdown_tx: oneshot::Sender<()>,
    accept_task: JoinHandle<()>,
}

impl Gateway {
    /// Binds `addr` and starts accepting connections.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Bind`] if the listener socket cannot be
    /// bound.
    pub async fn open(
        addr: &str,
        responser: CallResponser,
        streamer: Arc<CallStreamer>,
    ) -> Result<Self, GatewayError> {
        let listener = TcpListener::bind(addr).await.map_err(|err| GatewayError::Bind {
            addr: addr.to_string(),
            reason: err.to_string(),
        })?;
        let local_addr = listener.local_addr().map_err(|err| GatewayError::Bind {
            addr: addr.to_string(),
            reason: err.to_string(),
        })?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let accept_task = tokio::spawn(accept_loop(listener, responser, streamer, shutdown_rx));
        info!(%local_addr, "gateway listening");

        Ok(Self {
            local_addr,
            shutdown_tx,
            accept_task,
        })
    }

    /// Returns the address the listener actually bound.
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Closes the listener and waits for the accept loop to finish.
    ///
    /// Connections already accepted keep running; only new connections
    /// stop being admitted.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
        let _ = self.accept_task.await;
        info!(local_addr = %self.local_addr, "gateway stopped");
    }
}

/// Accepts sockets until shut down, one connection task per socket.
async fn accept_loop(
    listener: TcpListener,
    responser: CallResponser,
    streamer: Arc<CallStreamer>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    loop {
        tokio::select! {
            _ = &mut shutdown_rx => {
                debug!("gateway accept loop shutting down");
                break;
            }
            accepted = listener.accept() => match accepted {
                Ok((socket, peer)) => {
                    let connection =
                        ClientConnection::new(responser.clone(), Arc::clone(&streamer));
                    debug!(%peer, connection = %connection.id(), "connection accepted");
                    tokio::spawn(connection.run(socket));
                }
                Err(err) => {
                    warn!(error = %err, "accept failed");
                }
            }
        }
    }
}
