//! Protocol layer for the WowWee MiP self-balancing robot.
//!
//! Frames are encoded by [`command`], decoded by [`response`] and
//! [`notification`], and moved over Bluetooth LE by a caller-supplied
//! [`Transport`]. [`Mip`] ties these together into one session.

pub mod command;
pub mod config;
pub mod constants;
pub mod device;
pub mod error;
pub mod notification;
pub mod response;
pub mod transport;
pub mod types;

// Re-export the session and its common companions
pub use config::Config;
pub use device::Mip;
pub use error::{MipError, Result};
pub use transport::{Expect, Transport};
