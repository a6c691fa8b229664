//! Protocol Module
//!
//! Minimal HTTP/1.1 framing for the imgFS server.
//!
//! ## Request Format
//! ```text
//! ┌────────────────────────────────────────────┐
//! │ METHOD SP URI SP HTTP/1.1 CRLF             │
//! │ Header-Name: value CRLF    (repeated)      │
//! │ CRLF                                       │
//! │ Body (Content-Length bytes, may be absent) │
//! └────────────────────────────────────────────┘
//! ```
//!
//! ### Routes
//! - `GET  /imgfs/list`                    -> JSON listing
//! - `GET  /imgfs/read?res=R&img_id=N`     -> image bytes
//! - `GET  /imgfs/delete?img_id=N`         -> 302 to index
//! - `POST /imgfs/insert?name=N` + body    -> 302 to index
//! - `GET  /` or `/index.html`             -> index page
//!
//! ### Response Format
//! ```text
//! HTTP/1.1 SP STATUS CRLF
//! extra headers
//! Content-Length: N CRLF
//! CRLF
//! body
//! ```

mod codec;
mod command;
mod response;

pub use codec::{
    get_query_var, read_request, write_response, Request, MAX_BODY_SIZE, MAX_HEADER_SIZE,
};
pub use command::{Command, Route};
pub use response::{Response, Status};
