//! One accepted socket.
//!
//! A connection owns no application state. It decodes newline-delimited
//! [`Frame`]s off its socket, routes calls to the responser and stream
//! frames to the streamer, and writes reply frames back on the same
//! socket. Connections are independent of each other, and within one
//! connection each inbound call runs on its own task, so replies
//! complete out of order and are matched by their [`CallId`].
//!
//! All writes go through one outbound queue drained by a writer task;
//! that queue is also the sink handed to the streamer on subscribe, so
//! call results and stream events interleave on the wire without two
//! writers racing on the socket.

use std::sync::Arc;

use hive_proto::Frame;
use hive_types::ConnectionId;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::responser::CallResponser;
use crate::streamer::CallStreamer;

/// Outbound frames queued per connection.
///
/// When the queue is full the streamer drops events for this subscriber
/// rather than block a publisher; call results always wait for room.
const OUTBOUND_BUFFER_SIZE: usize = 64;

/// Routes one socket's frames to the responser and streamer.
#[derive(Debug)]
pub struct ClientConnection {
    id: ConnectionId,
    responser: CallResponser,
    streamer: Arc<CallStreamer>,
}

impl ClientConnection {
    /// Creates a connection with a fresh id.
    #[must_use]
    pub fn new(responser: CallResponser, streamer: Arc<CallStreamer>) -> Self {
        Self {
            id: ConnectionId::new(),
            responser,
            streamer,
        }
    }

    /// Returns this connection's id.
    #[must_use]
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Services the socket until the peer closes it or reading fails.
    ///
    /// On exit every subscription this connection holds is released; a
    /// call still in flight keeps running and its result is written if
    /// the write half is still open, dropped otherwise.
    pub async fn run(self, socket: TcpStream) {
        let (read_half, write_half) = socket.into_split();
        let (out_tx, out_rx) = mpsc::channel(OUTBOUND_BUFFER_SIZE);
        tokio::spawn(write_frames(self.id, write_half, out_rx));

        let mut lines = BufReader::new(read_half).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => self.handle_line(&line, &out_tx).await,
                Ok(None) => break,
                Err(err) => {
                    debug!(connection = %self.id, error = %err, "read failed");
                    break;
                }
            }
        }

        self.streamer.release_connection(self.id);
        debug!(connection = %self.id, "connection closed");
    }

    async fn handle_line(&self, line: &str, out_tx: &mpsc::Sender<Frame>) {
        let frame = match Frame::from_line(line) {
            Ok(frame) => frame,
            Err(err) => {
                warn!(connection = %self.id, error = %err, "skipping undecodable frame");
                return;
            }
        };
        debug!(connection = %self.id, frame = frame.name(), "inbound frame");

        match frame {
            Frame::Call { id, call } => {
                // Own task per call: a slow procedure must not hold up
                // the frames behind it.
                let responser = self.responser.clone();
                let out_tx = out_tx.clone();
                tokio::spawn(async move {
                    let outcome = responser.process(call).await;
                    let _ = out_tx.send(Frame::CallResult { id, outcome }).await;
                });
            }
            Frame::Subscribe { id, topic } => {
                let subscription = self.streamer.subscribe(topic, self.id, out_tx.clone());
                let _ = out_tx.send(Frame::Subscribed { id, subscription }).await;
            }
            Frame::Unsubscribe { subscription } => {
                self.streamer.unsubscribe(subscription);
            }
            Frame::Publish { topic, value } => {
                self.streamer.publish(&topic, &value);
            }
            other => {
                warn!(
                    connection = %self.id,
                    frame = other.name(),
                    "frame is not a request, ignoring"
                );
            }
        }
    }
}

/// Drains the outbound queue onto the socket, one frame per line.
///
/// Exits when every sender is gone (connection teardown plus the last
/// in-flight call) or the first write fails.
async fn write_frames(
    connection: ConnectionId,
    mut write_half: OwnedWriteHalf,
    mut out_rx: mpsc::Receiver<Frame>,
) {
    while let Some(frame) = out_rx.recv().await {
        let line = match frame.to_line() {
            Ok(line) => line,
            Err(err) => {
                warn!(%connection, error = %err, "dropping unencodable frame");
                continue;
            }
        };
        let write = async {
            write_half.write_all(line.as_bytes()).await?;
            write_half.write_all(b"\n").await
        };
        if let Err(err) = write.await {
            debug!(%connection, error = %err, "write failed, dropping remaining frames");
            break;
        }
    }
}
