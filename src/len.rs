//! Fixed sizes for the Fastboot wire protocol.
//!
//! IMPORTANT: these are load-bearing. The command block, response frame, and
//! download-size buffer are all statically sized; nothing in this crate grows
//! them at runtime.

/// Maximum size of an inbound command block.
pub const COMMAND_SIZE: usize = 64;

/// Command block buffer size: the command bytes plus a trailing NUL the
/// parser appends to ease verb matching.
pub const COMMAND_BUF: usize = COMMAND_SIZE + 1;

/// Size of a response frame put on the wire.
pub const RESPONSE_SIZE: usize = 64;

/// Length of the four-byte status prefix (`OKAY`, `FAIL`, `DATA`, `INFO`).
pub const PREFIX_LEN: usize = 4;

/// Maximum number of ASCII hex digits in a `download:<hex>` argument.
pub const DOWNLOAD_HEX_DIGITS: usize = 8;
