//! Response definitions
//!
//! Represents HTTP replies to clients.

/// Status lines used by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Found,
    ServiceUnavailable,
    InternalServerError,
}

impl Status {
    /// Code and reason phrase
    pub fn line(self) -> &'static str {
        match self {
            Status::Ok => "200 OK",
            Status::Found => "302 Found",
            Status::ServiceUnavailable => "503 Service Unavailable",
            Status::InternalServerError => "500 Internal Server Error",
        }
    }
}

/// A response to send to the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Status line
    pub status: Status,

    /// Extra headers (Content-Length is added on encode)
    pub headers: Vec<(String, String)>,

    /// Body bytes
    pub body: Vec<u8>,
}

impl Response {
    /// 200 with a typed body
    pub fn ok(content_type: &str, body: Vec<u8>) -> Self {
        Self {
            status: Status::Ok,
            headers: vec![("Content-Type".to_string(), content_type.to_string())],
            body,
        }
    }

    /// 302 to `location`
    pub fn redirect(location: &str) -> Self {
        Self {
            status: Status::Found,
            headers: vec![("Location".to_string(), location.to_string())],
            body: Vec::new(),
        }
    }

    /// 500 carrying the error message
    pub fn error(message: &str) -> Self {
        Self {
            status: Status::InternalServerError,
            headers: Vec::new(),
            body: format!("Error: {}\n", message).into_bytes(),
        }
    }

    /// 503 sent when the connection limit is reached
    pub fn busy() -> Self {
        Self {
            status: Status::ServiceUnavailable,
            headers: vec![("Connection".to_string(), "close".to_string())],
            body: Vec::new(),
        }
    }

    /// Header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Wire bytes
    pub fn encode(&self) -> Vec<u8> {
        let mut head = format!("HTTP/1.1 {}\r\n", self.status.line());
        for (name, value) in &self.headers {
            head.push_str(name);
            head.push_str(": ");
            head.push_str(value);
            head.push_str("\r\n");
        }
        head.push_str(&format!("Content-Length: {}\r\n\r\n", self.body.len()));

        let mut out = Vec::with_capacity(head.len() + self.body.len());
        out.extend_from_slice(head.as_bytes());
        out.extend_from_slice(&self.body);
        out
    }
}
