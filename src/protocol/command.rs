//! Command definitions
//!
//! Maps a parsed request onto a container operation.

use crate::error::{ImgfsError, Result};
use crate::storage::Resolution;

use super::{get_query_var, Request};

/// A container operation requested by a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List image ids as JSON
    List,

    /// Read one image at a resolution
    Read { img_id: String, resolution: Resolution },

    /// Insert the request body under a name
    Insert { img_id: String, data: Vec<u8> },

    /// Delete an image
    Delete { img_id: String },
}

/// Where a request goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// The static index page
    Index,

    /// A container operation
    Command(Command),
}

impl Route {
    /// Route a request
    ///
    /// URIs are matched by prefix, methods exactly.
    pub fn from_request(request: Request) -> Result<Self> {
        let uri = request.uri.as_str();

        if request.path() == "/" || uri.starts_with("/index.html") {
            return Ok(Route::Index);
        }

        let command = if uri.starts_with("/imgfs/list") {
            Command::List
        } else if uri.starts_with("/imgfs/insert") && request.method == "POST" {
            let img_id = required_var(uri, "name")?;
            if request.body.is_empty() {
                return Err(ImgfsError::InvalidArgument("empty image body".to_string()));
            }
            Command::Insert {
                img_id,
                data: request.body,
            }
        } else if uri.starts_with("/imgfs/read") {
            let resolution = required_var(uri, "res")?.parse()?;
            let img_id = required_var(uri, "img_id")?;
            Command::Read { img_id, resolution }
        } else if uri.starts_with("/imgfs/delete") {
            Command::Delete {
                img_id: required_var(uri, "img_id")?,
            }
        } else {
            return Err(ImgfsError::InvalidCommand(format!(
                "{} {}",
                request.method, request.uri
            )));
        };

        Ok(Route::Command(command))
    }
}

fn required_var(uri: &str, name: &str) -> Result<String> {
    get_query_var(uri, name)?
        .ok_or_else(|| ImgfsError::InvalidArgument(format!("missing '{}' parameter", name)))
}
