/// Session configuration.
///
/// Response timeouts belong to the [`Transport`](crate::transport::Transport):
/// the session always waits for `receive_response` to finish, so the
/// transport can pair every late reply with the request it answers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Opaque string handed to [`Transport::open`](crate::transport::Transport::open),
    /// e.g. an adapter name or serial port.
    pub init_options: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn init_options(mut self, options: impl Into<String>) -> Self {
        self.init_options = Some(options.into());
        self
    }
}
