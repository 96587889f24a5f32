use crate::config::TransportKind;
use crate::len::{PREFIX_LEN, RESPONSE_SIZE};
use crate::transport::Transport;

/// The four reserved Fastboot response prefixes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Prefix {
    Okay,
    Fail,
    Data,
    Info,
}

impl Prefix {
    fn as_bytes(self) -> &'static [u8; PREFIX_LEN] {
        match self {
            Self::Okay => b"OKAY",
            Self::Fail => b"FAIL",
            Self::Data => b"DATA",
            Self::Info => b"INFO",
        }
    }
}

/// Builds and emits a 64-byte Fastboot response frame.
///
/// `payload` is ASCII and is expected to fit in `RESPONSE_SIZE - PREFIX_LEN`
/// bytes; every call site in this crate builds its payload from a fixed,
/// well-under-64-byte buffer, so an over-long payload here is a programming
/// error rather than something a host can trigger over the wire. In debug
/// builds that invariant is asserted; in release builds the payload is
/// truncated.
pub fn respond(transport: &mut dyn Transport, prefix: Prefix, payload: &[u8]) {
    let max_payload = RESPONSE_SIZE - PREFIX_LEN;
    debug_assert!(
        payload.len() <= max_payload,
        "response payload exceeds frame size"
    );
    let payload_len = payload.len().min(max_payload);

    let mut buf = [0u8; RESPONSE_SIZE];
    buf[..PREFIX_LEN].copy_from_slice(prefix.as_bytes());
    buf[PREFIX_LEN..PREFIX_LEN + payload_len].copy_from_slice(&payload[..payload_len]);
    let total = PREFIX_LEN + payload_len;

    if transport.kind() == TransportKind::Spis && transport.prep_response().is_err() {
        log::warn!("SPI slave failed to prepare for TX");
    }

    for &b in &buf[..total] {
        transport.write_byte(b);
    }

    match transport.kind() {
        TransportKind::Usb => transport.flush(),
        TransportKind::Spis => {
            for _ in total..RESPONSE_SIZE {
                transport.write_byte(0);
            }
        }
    }

    log::info!(
        "resp: {}",
        core::str::from_utf8(&buf[..total]).unwrap_or("<non-utf8 response>")
    );
}

/// Convenience wrapper for `respond` with a UTF-8 payload.
pub fn respond_str(transport: &mut dyn Transport, prefix: Prefix, payload: &str) {
    respond(transport, prefix, payload.as_bytes());
}
