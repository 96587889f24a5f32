//! Top-level session driver.
//!
//! Replaces the original source's `fastboot_usb`/`fastboot_spis` pair (two
//! near-identical polling loops, one per transport) with a single loop: the
//! USB/SPIS difference now lives entirely inside [`crate::download::begin`]
//! and [`crate::framer::respond`], which already branch on
//! [`crate::transport::Transport::kind`].

use crate::config::{SessionConfig, TransportKind};
use crate::dispatcher::{dispatch_command, dispatch_data, Phase, Session};
use crate::error::{Error, Result};
use crate::len::COMMAND_SIZE;
use crate::framer::{respond, Prefix};
use crate::transport::Transport;

/// Runs one Fastboot session to completion.
///
/// Blocks, polling `transport.availability()`, until a `continue` command is
/// received or a BL1 download finishes (the two ways a session ends).
///
/// Before entering the loop, validates that `transport` actually implements
/// the capability set its [`TransportKind`] requires (USB: `flush`; SPIS:
/// `read_bulk`, `prep_response`) and returns
/// [`Error::invalid_argument`] without side effects if it doesn't — the
/// Rust-trait equivalent of the original source's per-transport
/// function-pointer null checks (`config->getchar == NULL`, ...), since a
/// [`Transport`] impl can silently leave an optional method at its "not
/// supported" default instead of a null pointer.
pub fn run_session(
    transport: &mut dyn Transport,
    cfg: &mut SessionConfig,
    session: &mut Session,
) -> Result<()> {
    validate_capabilities(transport)?;

    let mut command_buf = [0u8; COMMAND_SIZE];

    while !session.continue_requested() {
        let avail = transport.availability();
        if avail == 0 {
            continue;
        }

        match session.phase() {
            Phase::Command => {
                if avail as usize > COMMAND_SIZE {
                    // The block can't fit the fixed command buffer. Drain it
                    // off the wire in chunks before replying, so the host's
                    // oversized transfer doesn't keep `availability()`
                    // reporting the same bytes forever.
                    let mut remaining = avail as usize;
                    while remaining > 0 {
                        let n = remaining.min(COMMAND_SIZE);
                        transport.read_block(&mut command_buf[..n], n);
                        remaining -= n;
                    }
                    respond(transport, Prefix::Fail, b"Command too large");
                    continue;
                }

                let n = avail as usize;
                transport.read_block(&mut command_buf[..n], n);
                dispatch_command(transport, cfg, session, &command_buf[..n]);
            }
            Phase::Data => dispatch_data(transport, cfg, session, avail),
        }
    }

    Ok(())
}

/// Validates that `transport` implements the required capability set for
/// its [`TransportKind`]. `availability`, `read_block`, and `write_byte` are
/// not optional methods on [`Transport`] at all, so only the
/// transport-specific optional ones need checking here.
fn validate_capabilities(transport: &dyn Transport) -> Result<()> {
    match transport.kind() {
        TransportKind::Usb => {
            if !transport.supports_flush() {
                return Err(Error::invalid_argument(
                    "USB transport does not implement flush",
                ));
            }
        }
        TransportKind::Spis => {
            if !transport.supports_read_bulk() {
                return Err(Error::invalid_argument(
                    "SPIS transport does not implement read_bulk",
                ));
            }
            if !transport.supports_prep_response() {
                return Err(Error::invalid_argument(
                    "SPIS transport does not implement prep_response",
                ));
            }
        }
    }
    Ok(())
}
