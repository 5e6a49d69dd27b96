//! Server configuration.

/// Runtime settings of the chat server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port to bind to (0 picks a free port)
    pub port: u16,
    /// Capacity of each session's outbound queue, in frames.
    ///
    /// A session whose queue fills up is disconnected.
    pub outbound_buffer: usize,
    /// Default page size of the history endpoints
    pub history_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            outbound_buffer: 64,
            history_limit: 50,
        }
    }
}

impl ServerConfig {
    /// `host:port` string to bind to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
