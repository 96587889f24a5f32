//! Top-level command dispatch and per-session state.
//!
//! Groups the original source's free-standing `fastboot_state`,
//! `fastboot_continue`, and `wdt_tickle` statics into one [`Session`] value
//! the driver in [`crate::session`] owns.

use crate::command::{parse_command, ParseError, Verb};
use crate::config::SessionConfig;
use crate::download::{self, BeginOutcome, DownloadState};
use crate::framer::{respond, Prefix};
use crate::getvar;
use crate::transport::Transport;

/// Which kind of block the session driver should read next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Command,
    Data,
}

/// Mutable per-session state, owned by the caller of [`crate::session::run_session`].
pub struct Session {
    phase: Phase,
    download: DownloadState,
    continue_flag: bool,
    wdt_tickled: bool,
}

impl Session {
    pub fn new() -> Self {
        Self {
            phase: Phase::Command,
            download: DownloadState::new(),
            continue_flag: false,
            wdt_tickled: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether a `continue` command (or BL1's one-shot download-completion
    /// rule) has signalled that Fastboot mode should exit.
    pub fn continue_requested(&self) -> bool {
        self.continue_flag
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Dispatches one fully-received command block.
///
/// `block` must already be at most [`crate::len::COMMAND_SIZE`] bytes — the
/// session driver rejects oversized blocks before this is called, since that
/// rejection has to happen before the bytes are even read off the wire.
pub fn dispatch_command(transport: &mut dyn Transport, cfg: &mut SessionConfig, session: &mut Session, block: &[u8]) {
    log::info!(
        "cmd: {}",
        core::str::from_utf8(block).unwrap_or("<non-utf8 command>")
    );

    match parse_command(block) {
        Ok(Verb::GetVar(name)) => getvar::handle(transport, cfg, name),

        Ok(Verb::Download(arg)) => {
            match download::begin(transport, cfg, &mut session.download, arg) {
                BeginOutcome::AwaitingData => session.phase = Phase::Data,
                BeginOutcome::Completed { exit_after } => {
                    session.phase = Phase::Command;
                    if exit_after {
                        session.continue_flag = true;
                    }
                }
                BeginOutcome::Rejected => {}
            }
        }

        Ok(Verb::Upload) => download::handle_upload(transport, cfg, &session.download),

        Ok(Verb::Erase) => respond(transport, Prefix::Fail, b"Not supported"),

        Ok(Verb::Flash(partition)) => handle_flash(transport, cfg, &session.download, partition),

        Ok(Verb::Boot) => respond(transport, Prefix::Fail, b"Not supported"),

        Ok(Verb::Continue) => {
            respond(transport, Prefix::Okay, b"");
            session.continue_flag = true;
            // The original source returns immediately here, before the
            // watchdog tickle below — there's no point tickling a watchdog
            // the caller is about to stop servicing.
            return;
        }

        Ok(Verb::Reboot) => handle_reboot(transport, cfg, false),
        Ok(Verb::RebootBootloader) => handle_reboot(transport, cfg, true),

        Err(ParseError::TooLarge) => respond(transport, Prefix::Fail, b"Command too large"),
        Err(ParseError::UnrecognisedLowercase) => respond(
            transport,
            Prefix::Fail,
            b"Command not recognised. Check Fastboot version.",
        ),
        Err(ParseError::Unrecognised) => {
            respond(transport, Prefix::Fail, b"Command not recognised.")
        }
    }

    tickle_watchdog_once(cfg, session);
}

/// Feeds one block of a USB data phase.
///
/// Callers only reach this while `session.phase() == Phase::Data`.
pub fn dispatch_data(
    transport: &mut dyn Transport,
    cfg: &mut SessionConfig,
    session: &mut Session,
    chunk_len: u32,
) {
    if download::receive_chunk(transport, cfg, &mut session.download, chunk_len) {
        session.phase = Phase::Command;
        if cfg.boot_stage.is_bl1() {
            session.continue_flag = true;
        }
    }
}

fn tickle_watchdog_once(cfg: &mut SessionConfig, session: &mut Session) {
    if !session.wdt_tickled {
        let timeout = cfg.watchdog.default_timeout() / 2;
        cfg.watchdog.refresh(timeout);
        session.wdt_tickled = true;
    }
}

fn handle_flash(transport: &mut dyn Transport, cfg: &mut SessionConfig, download: &DownloadState, partition: &str) {
    fn starts_with(arg: &str, needle: &str) -> bool {
        arg.len() >= needle.len() && &arg[..needle.len()] == needle
    }

    if starts_with(partition, "boot") {
        let staged = &cfg.stage_buffer[..download.total() as usize];
        match cfg.partition_writer.write("boot", staged) {
            Ok(()) => respond(transport, Prefix::Okay, b""),
            Err(err) => respond(transport, Prefix::Fail, err.message().as_bytes()),
        }
    } else if starts_with(partition, "system") {
        respond(transport, Prefix::Fail, b"not implemented");
    } else {
        respond(transport, Prefix::Fail, b"unknown partition");
    }
}

fn handle_reboot(transport: &mut dyn Transport, cfg: &mut SessionConfig, bootloader: bool) {
    if cfg.boot_stage.is_bl1() {
        respond(transport, Prefix::Fail, b"Not supported");
        return;
    }

    if bootloader {
        respond(
            transport,
            Prefix::Info,
            b"reboot-bootloader not supported, rebooting normally.",
        );
    }

    // Force an immediate watchdog reset.
    cfg.watchdog.refresh(0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BootStage, NullWatchdog, StubPartitionWriter, TransportKind};
    use crate::test_support::LoopbackTransport;

    fn cfg<'a>(
        stage_buffer: &'a mut [u8],
        writer: &'a mut StubPartitionWriter,
        wdt: &'a mut NullWatchdog,
    ) -> SessionConfig<'a> {
        SessionConfig {
            serial_number: b"",
            stage_buffer,
            max_download_size: 8_388_608,
            hard_download_cap: 16_777_216,
            boot_stage: BootStage::Bl2,
            debug_build: true,
            secure_boot: false,
            recovery_signalled: false,
            partition_writer: writer,
            watchdog: wdt,
        }
    }

    #[test]
    fn continue_sets_flag_and_skips_tickle() {
        let mut stage = [0u8; 16];
        let mut writer = StubPartitionWriter;
        let mut wdt = NullWatchdog;
        let mut c = cfg(&mut stage, &mut writer, &mut wdt);
        let mut t = LoopbackTransport::new(TransportKind::Usb);
        let mut session = Session::new();

        dispatch_command(&mut t, &mut c, &mut session, b"continue");
        assert_eq!(t.take_written(), b"OKAY");
        assert!(session.continue_requested());
    }

    #[test]
    fn unrecognised_commands() {
        let mut stage = [0u8; 16];
        let mut writer = StubPartitionWriter;
        let mut wdt = NullWatchdog;
        let mut c = cfg(&mut stage, &mut writer, &mut wdt);
        let mut t = LoopbackTransport::new(TransportKind::Usb);
        let mut session = Session::new();

        dispatch_command(&mut t, &mut c, &mut session, b"flibbertigibbet");
        assert_eq!(
            t.take_written(),
            b"FAILCommand not recognised. Check Fastboot version."
        );

        dispatch_command(&mut t, &mut c, &mut session, b"!!!");
        assert_eq!(t.take_written(), b"FAILCommand not recognised.");
    }

    #[test]
    fn flash_boot_calls_partition_writer() {
        let mut stage = [0xAAu8; 16];
        let mut writer = StubPartitionWriter;
        let mut wdt = NullWatchdog;
        let mut c = cfg(&mut stage, &mut writer, &mut wdt);
        let mut t = LoopbackTransport::new(TransportKind::Usb);
        let mut session = Session::new();

        dispatch_command(&mut t, &mut c, &mut session, b"flash:boot");
        assert_eq!(t.take_written(), b"OKAY");
    }

    #[test]
    fn flash_system_not_implemented() {
        let mut stage = [0u8; 16];
        let mut writer = StubPartitionWriter;
        let mut wdt = NullWatchdog;
        let mut c = cfg(&mut stage, &mut writer, &mut wdt);
        let mut t = LoopbackTransport::new(TransportKind::Usb);
        let mut session = Session::new();

        dispatch_command(&mut t, &mut c, &mut session, b"flash:system");
        assert_eq!(t.take_written(), b"FAILnot implemented");
    }

    #[test]
    fn reboot_bootloader_falls_back_to_normal_reboot() {
        let mut stage = [0u8; 16];
        let mut writer = StubPartitionWriter;
        let mut wdt = NullWatchdog;
        let mut c = cfg(&mut stage, &mut writer, &mut wdt);
        let mut t = LoopbackTransport::new(TransportKind::Usb);
        let mut session = Session::new();

        dispatch_command(&mut t, &mut c, &mut session, b"reboot-bootloader");
        assert_eq!(
            t.take_written(),
            b"INFOreboot-bootloader not supported, rebooting normally."
        );
    }

    #[test]
    fn reboot_refused_in_bl1() {
        let mut stage = [0u8; 16];
        let mut writer = StubPartitionWriter;
        let mut wdt = NullWatchdog;
        let mut c = cfg(&mut stage, &mut writer, &mut wdt);
        c.boot_stage = BootStage::Bl1;
        let mut t = LoopbackTransport::new(TransportKind::Usb);
        let mut session = Session::new();

        dispatch_command(&mut t, &mut c, &mut session, b"reboot");
        assert_eq!(t.take_written(), b"FAILNot supported");
    }
}
