//! The boundary between the protocol layer and the radio.
//!
//! A [`Transport`] moves opaque frames to and from one robot. It owns the
//! wireless stack, discovery, connection state and any timeouts; the session
//! only ever sees bytes and [`MipError`](crate::error::MipError) values.

use std::future::Future;

use bytes::Bytes;

use crate::error::Result;

/// Whether the robot will answer a request with a response frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expect {
    NoResponse,
    Response,
}

pub trait Transport: Sized + Send {
    /// Create the transport. `options` is passed through untouched from
    /// [`Config::init_options`](crate::config::Config).
    fn open(options: Option<&str>) -> impl Future<Output = Result<Self>> + Send;

    /// Release every resource held by the transport. Called exactly once.
    fn close(self) -> impl Future<Output = ()> + Send;

    /// Connect to the named robot, or the first one discovered when `name` is `None`.
    fn connect(&mut self, name: Option<&str>) -> impl Future<Output = Result<()>> + Send;

    fn disconnect(&mut self) -> impl Future<Output = Result<()>> + Send;

    fn start_discovery(&mut self) -> impl Future<Output = Result<()>> + Send;

    fn discovered_count(&mut self) -> impl Future<Output = Result<usize>> + Send;

    fn discovered_name(&mut self, index: usize) -> impl Future<Output = Result<String>> + Send;

    fn stop_discovery(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Write one request frame. Fails with `NotConnected` when no robot is connected.
    fn send(&mut self, frame: &[u8], expect: Expect) -> impl Future<Output = Result<()>> + Send;

    /// Wait for the response to the last request sent with [`Expect::Response`].
    ///
    /// Fails with `NoRequest` when nothing is outstanding and `Timeout` when
    /// the robot does not answer in time. After a `Timeout` the request is no
    /// longer outstanding: a reply that turns up later must be dropped, never
    /// handed to the next request. `MipError` converts from
    /// `tokio::time::error::Elapsed`, so a `tokio::time::timeout` around the
    /// wait can be propagated with `?`.
    fn receive_response(&mut self) -> impl Future<Output = Result<Bytes>> + Send;

    /// Pop the oldest queued out-of-band frame without waiting. `Ok(None)` means the queue is empty.
    fn poll_out_of_band(&mut self) -> impl Future<Output = Result<Option<Bytes>>> + Send;
}
