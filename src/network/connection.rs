//! Connection Handler
//!
//! Handles individual client connections.

use std::fs;
use std::io::{BufReader, BufWriter};
use std::net::TcpStream;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::engine::{Engine, Reply};
use crate::error::{ImgfsError, Result};
use crate::protocol::{read_request, write_response, Command, Request, Response, Route};

/// Handles a single client connection
pub struct Connection {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Shared container
    engine: Arc<Engine>,

    /// Port the server listens on (used in redirects)
    port: u16,

    /// Page served for the root URI
    index_file: Option<PathBuf>,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Create a new connection handler
    pub fn new(
        stream: TcpStream,
        engine: Arc<Engine>,
        port: u16,
        index_file: Option<PathBuf>,
    ) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        stream.set_nodelay(true)?;

        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            engine,
            port,
            index_file,
            peer_addr,
        })
    }

    /// Configure connection timeouts (0 leaves a direction blocking)
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        if read_ms > 0 {
            self.reader
                .get_ref()
                .set_read_timeout(Some(Duration::from_millis(read_ms)))?;
        }
        if write_ms > 0 {
            self.writer
                .get_ref()
                .set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }
        Ok(())
    }

    /// Serve requests until the client disconnects or asks to close
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("Connection established from {}", self.peer_addr);

        loop {
            let request = match read_request(&mut self.reader) {
                Ok(req) => req,
                Err(ImgfsError::Io(ref e)) if is_disconnect(e.kind()) => {
                    tracing::debug!("Client {} disconnected", self.peer_addr);
                    return Ok(());
                }
                Err(ImgfsError::Io(ref e))
                    if matches!(
                        e.kind(),
                        std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                    ) =>
                {
                    tracing::debug!("Read timeout for client {}", self.peer_addr);
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!("Error reading from {}: {}", self.peer_addr, e);
                    let _ = self.send_response(Response::error(&e.to_string()));
                    return Err(e);
                }
            };

            tracing::trace!(
                "Received {} {} from {} ({} byte body)",
                request.method,
                request.uri,
                self.peer_addr,
                request.body.len()
            );

            let close = request.wants_close();
            let response = self.respond(request);

            if let Err(e) = self.send_response(response) {
                if let ImgfsError::Io(ref io_err) = e {
                    if is_disconnect(io_err.kind()) {
                        tracing::debug!(
                            "Client {} disconnected before response could be sent: {}",
                            self.peer_addr,
                            e
                        );
                        return Ok(());
                    }
                }
                tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
                return Err(e);
            }

            if close {
                return Ok(());
            }
        }
    }

    /// Route a request and turn the outcome into a response
    fn respond(&self, request: Request) -> Response {
        let outcome = Route::from_request(request).and_then(|route| match route {
            Route::Index => self.serve_index(),
            Route::Command(command) => self.execute_command(command),
        });

        match outcome {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("Request from {} failed: {}", self.peer_addr, e);
                Response::error(&e.to_string())
            }
        }
    }

    fn execute_command(&self, command: Command) -> Result<Response> {
        match self.engine.execute(command)? {
            Reply::Listing(json) => Ok(Response::ok("application/json", json.into_bytes())),
            Reply::Image(bytes) => Ok(Response::ok("image/jpeg", bytes)),
            Reply::Done => Ok(Response::redirect(&self.index_location())),
        }
    }

    fn serve_index(&self) -> Result<Response> {
        match &self.index_file {
            Some(path) => Ok(Response::ok("text/html; charset=utf-8", fs::read(path)?)),
            None => Err(ImgfsError::Config("no index page configured".to_string())),
        }
    }

    fn index_location(&self) -> String {
        format!("http://localhost:{}/index.html", self.port)
    }

    fn send_response(&mut self, response: Response) -> Result<()> {
        write_response(&mut self.writer, &response)
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

fn is_disconnect(kind: std::io::ErrorKind) -> bool {
    matches!(
        kind,
        std::io::ErrorKind::UnexpectedEof
            | std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::ConnectionAborted
            | std::io::ErrorKind::BrokenPipe
    )
}
