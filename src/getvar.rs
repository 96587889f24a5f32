//! Resolution for `getvar:<name>`.
//!
//! Each arm sends its own response directly (mirroring the original source's
//! `handle_get_var`, which never returns a value to its caller) rather than
//! building a `Result` the dispatcher would have to unpack.

use crate::config::{BootStage, SessionConfig};
use crate::framer::{respond, respond_str, Prefix};
use crate::hex;
use crate::len::{PREFIX_LEN, RESPONSE_SIZE};
use crate::transport::Transport;

/// Matching is by prefix, same as [`crate::command::parse_command`]: `arg`
/// like `version-bootloader` matches the `version` variable family before
/// the more specific sub-match runs.
fn starts_with(arg: &str, needle: &str) -> bool {
    arg.len() >= needle.len() && &arg[..needle.len()] == needle
}

/// Resolves and responds to one `getvar:<name>` request.
pub fn handle(transport: &mut dyn Transport, cfg: &SessionConfig, name: &str) {
    if starts_with(name, "version") {
        if starts_with(name, "version-bootloader") {
            respond_str(transport, Prefix::Okay, crate::config::BOOTLOADER_VERSION);
        } else if starts_with(name, "version-baseband") {
            respond_str(transport, Prefix::Okay, crate::config::BASEBAND_VERSION);
        } else {
            respond_str(transport, Prefix::Okay, crate::config::PROTOCOL_VERSION);
        }
        return;
    }

    if starts_with(name, "product") {
        respond_str(transport, Prefix::Okay, crate::config::PRODUCT);
        return;
    }

    if starts_with(name, "serialno") {
        handle_serialno(transport, cfg);
        return;
    }

    if starts_with(name, "secure") {
        let text = if cfg.secure_boot { "yes" } else { "no" };
        respond_str(transport, Prefix::Okay, text);
        return;
    }

    if starts_with(name, "is-userspace") {
        respond_str(transport, Prefix::Okay, "no");
        return;
    }

    if starts_with(name, "max-download-size") {
        handle_max_download_size(transport, cfg);
        return;
    }

    if starts_with(name, "Bootstage") {
        respond_str(transport, Prefix::Okay, stage_str(cfg.boot_stage));
        return;
    }

    if starts_with(name, "Recovery") {
        let text = if cfg.recovery_signalled { "yes" } else { "no" };
        respond_str(transport, Prefix::Okay, text);
        return;
    }

    respond_str(transport, Prefix::Fail, "Variable not found");
}

fn stage_str(stage: BootStage) -> &'static str {
    stage.into()
}

fn handle_serialno(transport: &mut dyn Transport, cfg: &SessionConfig) {
    if cfg.serial_number.is_empty() {
        respond_str(transport, Prefix::Fail, "Not supported");
        return;
    }

    let max_payload = RESPONSE_SIZE - PREFIX_LEN;
    if cfg.serial_number.len() * 2 > max_payload {
        respond_str(transport, Prefix::Fail, "Not supported");
        return;
    }

    let mut buf = [0u8; RESPONSE_SIZE - PREFIX_LEN];
    let n = hex::format_hex_bytes(&mut buf, cfg.serial_number);
    respond(transport, Prefix::Okay, &buf[..n]);
}

fn handle_max_download_size(transport: &mut dyn Transport, cfg: &SessionConfig) {
    let mut buf = [0u8; RESPONSE_SIZE - PREFIX_LEN];
    let n = hex::format_dec(&mut buf, cfg.max_download_size);

    let max_payload = RESPONSE_SIZE - PREFIX_LEN;
    if n > max_payload {
        respond_str(transport, Prefix::Fail, "Not supported");
        return;
    }

    respond(transport, Prefix::Okay, &buf[..n]);
}
