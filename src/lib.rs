#![cfg_attr(not(feature = "std"), no_std)]

//! # MV Fastboot
//!
//! Device-side implementation of the Fastboot protocol, for the early-boot
//! and recovery stages of Movidius Keembay-family SoCs.
//!
//! This crate owns wire framing, command parsing, variable resolution, and
//! the two-phase download/upload state machine. It does not own a transport:
//! callers implement [`transport::Transport`] over their USB stack or SPI
//! slave peripheral, and implement [`config::PartitionWriter`] /
//! [`config::Watchdog`] over their flash driver and watchdog register.
//!
//! ## Using with `std`
//!
//! This library is `no-std` by default. The `std` feature only enables the
//! [`test_support`] module's [`test_support::LoopbackTransport`] test double
//! outside of `cfg(test)` builds; it does not change anything about the core
//! protocol implementation, which never allocates.

#[cfg(any(test, feature = "std"))]
extern crate std;

/// Command verb parser (`getvar:`, `download:`, `flash:`, ...).
pub mod command;
/// Caller-supplied configuration and external collaborator traits.
pub mod config;
/// Two-phase download engine and `upload` support.
pub mod download;
/// Top-level command dispatcher and session state machine.
pub mod dispatcher;
/// Library error type.
pub mod error;
/// Response framing (`OKAY`/`FAIL`/`DATA`/`INFO`).
pub mod framer;
/// Variable resolution for `getvar:<name>`.
pub mod getvar;
/// ASCII hex/decimal codec for wire values.
pub mod hex;
/// Fixed sizes for the wire protocol.
pub mod len;
/// Logging convenience helpers.
pub mod logging;
/// Top-level session driver.
pub mod session;
/// In-memory [`transport::Transport`] test double.
#[cfg(any(test, feature = "std"))]
pub mod test_support;
/// Transport abstraction unifying USB-bulk and SPI-slave byte pipes.
pub mod transport;

pub use command::{ParseError, Verb};
pub use config::{
    BootStage, NullWatchdog, PartitionWriter, SessionConfig, StubPartitionWriter, TransportKind,
    Watchdog,
};
pub use error::{Error, ErrorCode, Result};
pub use framer::Prefix;
pub use session::run_session;
pub use transport::Transport;
