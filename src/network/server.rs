//! TCP Server
//!
//! Accepts connections and gives each one its own thread.

use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::config::Config;
use crate::engine::Engine;
use crate::error::Result;
use crate::protocol::{write_response, Response};

use super::Connection;

/// How long the accept loop sleeps when no client is waiting
const ACCEPT_POLL: Duration = Duration::from_millis(50);

/// HTTP server for one container
pub struct Server {
    config: Config,
    engine: Arc<Engine>,
    listener: Option<TcpListener>,
    shutdown: Arc<AtomicBool>,
    active: Arc<AtomicUsize>,
}

impl Server {
    /// Create a new server with the given config and engine
    pub fn new(config: Config, engine: Arc<Engine>) -> Self {
        Self {
            config,
            engine,
            listener: None,
            shutdown: Arc::new(AtomicBool::new(false)),
            active: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Bind the listening socket, returning the bound address
    ///
    /// With port 0 the OS picks a port; the config is updated so redirects
    /// name the real one.
    pub fn bind(&mut self) -> Result<SocketAddr> {
        let listener = TcpListener::bind(self.config.listen_addr())?;
        listener.set_nonblocking(true)?;
        let addr = listener.local_addr()?;
        self.config.port = addr.port();
        self.listener = Some(listener);
        tracing::info!("imgFS server listening on http://{}", addr);
        Ok(addr)
    }

    /// Start the server (blocking until shutdown)
    pub fn run(&mut self) -> Result<()> {
        if self.listener.is_none() {
            self.bind()?;
        }
        let listener = match self.listener.take() {
            Some(l) => l,
            None => return Ok(()),
        };

        while !self.shutdown.load(Ordering::Relaxed) {
            match listener.accept() {
                Ok((stream, addr)) => {
                    if let Err(e) = self.dispatch(stream) {
                        tracing::warn!("Failed to dispatch connection from {}: {}", addr, e);
                    }
                }
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL);
                }
                Err(ref e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    tracing::error!("Accept failed: {}", e);
                    return Err(e.into());
                }
            }
        }

        tracing::info!("Accept loop stopped");
        Ok(())
    }

    /// Hand an accepted stream to a worker thread
    fn dispatch(&self, stream: TcpStream) -> Result<()> {
        stream.set_nonblocking(false)?;

        if self.active.load(Ordering::SeqCst) >= self.config.max_connections {
            tracing::warn!("Connection limit ({}) reached", self.config.max_connections);
            let mut stream = stream;
            write_response(&mut stream, &Response::busy())?;
            return Ok(());
        }

        let mut connection = Connection::new(
            stream,
            Arc::clone(&self.engine),
            self.config.port,
            self.config.index_file.clone(),
        )?;
        connection.set_timeouts(self.config.read_timeout_ms, self.config.write_timeout_ms)?;

        let active = Arc::clone(&self.active);
        active.fetch_add(1, Ordering::SeqCst);
        thread::spawn(move || {
            if let Err(e) = connection.handle() {
                tracing::debug!("Connection {} ended with error: {}", connection.peer_addr(), e);
            }
            active.fetch_sub(1, Ordering::SeqCst);
        });

        Ok(())
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Flag that stops the accept loop when set (for other threads)
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Number of connections currently being served
    pub fn active_connections(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}
