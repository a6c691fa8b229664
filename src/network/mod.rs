//! Network Module
//!
//! TCP server and client handling.
//!
//! ## Architecture
//! - Single acceptor thread (non-blocking accept, polls the shutdown flag)
//! - One thread per connection
//! - Commands routed through the Engine's single container lock

mod connection;
mod server;

pub use connection::Connection;
pub use server::Server;
