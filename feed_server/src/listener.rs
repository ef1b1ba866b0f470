//! TCP feed listener.
//!
//! `FeedListener` owns the listening socket and hands every accepted
//! connection to the server event loop as a `ViewerEvent::Connected`. For
//! each connection a small reader thread drains whatever the viewer sends
//! (the protocol is one-way, so inbound bytes are discarded) and reports EOF
//! or a read error as `ViewerEvent::Disconnected`. An error on one
//! connection never stops the accept loop.

use std::io::Read;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread;

use crossbeam_channel::Sender;
use feed_common::{FeedError, Result};
use log::{debug, error, info};

/// Viewer lifecycle events pushed to the server event loop.
#[derive(Debug)]
pub enum ViewerEvent {
    /// A viewer connected; the stream is handed over for writing.
    Connected {
        /// Remote address identifying the viewer.
        peer: SocketAddr,
        /// Accepted connection, to be driven by a writer task.
        stream: TcpStream,
    },
    /// A viewer's connection ended (EOF or read error).
    Disconnected {
        /// Remote address of the departed viewer.
        peer: SocketAddr,
    },
}

/// Accepting side of the feed endpoint.
pub struct FeedListener {
    socket: TcpListener,
}

impl FeedListener {
    /// Bind the feed endpoint to `bind_addr` (e.g., `0.0.0.0:8080`).
    pub fn new(bind_addr: &str) -> Result<Self> {
        let socket = TcpListener::bind(bind_addr)?;
        Ok(Self { socket })
    }

    /// Address the listener is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Blocking accept loop.
    ///
    /// Each accepted connection is announced on `events`; a per-connection
    /// reader thread watches the viewer for disconnect. Returns only if the
    /// event channel closes.
    pub fn accept_loop(self, events: Sender<ViewerEvent>) -> Result<()> {
        info!("Feed endpoint listening on {}", self.socket.local_addr()?);
        for stream in self.socket.incoming() {
            match stream {
                Ok(stream) => {
                    let peer = match stream.peer_addr() {
                        Ok(peer) => peer,
                        Err(e) => {
                            error!("Failed to resolve peer address: {}", e);
                            continue;
                        }
                    };
                    let reader = match stream.try_clone() {
                        Ok(reader) => reader,
                        Err(e) => {
                            error!("Failed to clone stream for {}: {}", peer, e);
                            continue;
                        }
                    };
                    let reader_events = events.clone();
                    thread::spawn(move || drain_viewer_input(reader, peer, reader_events));
                    events
                        .send(ViewerEvent::Connected { peer, stream })
                        .map_err(|e| FeedError::ChannelSend(e.to_string()))?;
                    info!("Viewer connected from {}", peer);
                }
                Err(e) => error!("TCP connection error: {}", e),
            }
        }
        Ok(())
    }
}

/// Read until the viewer hangs up.
///
/// Viewers send nothing meaningful on this channel, so inbound bytes are
/// discarded rather than parsed.
fn drain_viewer_input(mut stream: TcpStream, peer: SocketAddr, events: Sender<ViewerEvent>) {
    let mut buf = [0u8; 512];
    loop {
        match stream.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => debug!("Ignoring {} inbound byte(s) from {}", n, peer),
            Err(e) => {
                debug!("Viewer {} read error: {}", peer, e);
                break;
            }
        }
    }
    let _ = events.send(ViewerEvent::Disconnected { peer });
}
