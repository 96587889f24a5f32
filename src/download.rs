//! Two-phase `download:<hex-size>` / data-phase engine, and `upload`.
//!
//! The original source keeps this as a handful of module-level statics
//! (`num_data_bytes`, `bytes_received_so_far`, `fastboot_data_staged`,
//! `download_size_buf`); here they're grouped into one [`DownloadState`] that
//! the dispatcher owns for the lifetime of a session.

use heapless::String;

use crate::config::SessionConfig;
use crate::framer::{respond, Prefix};
use crate::hex;
use crate::len::DOWNLOAD_HEX_DIGITS;
use crate::transport::Transport;

/// Outcome of a `download:<hex-size>` negotiation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BeginOutcome {
    /// The argument was rejected; a `FAIL` response has already been sent.
    Rejected,
    /// Negotiation succeeded (USB): the session must now enter the data
    /// phase and feed inbound blocks to [`receive_chunk`].
    AwaitingData,
    /// Negotiation and the full data transfer both completed synchronously
    /// (SPIS, which reads the whole payload in one DMA-style burst).
    Completed {
        /// Whether the download is BL1's cue to leave Fastboot mode.
        exit_after: bool,
    },
}

/// Tracks one session's download/upload staging area.
pub struct DownloadState {
    total: u32,
    received: u32,
    staged: bool,
    size_ascii: String<DOWNLOAD_HEX_DIGITS>,
}

impl DownloadState {
    pub fn new() -> Self {
        Self {
            total: 0,
            received: 0,
            staged: false,
            size_ascii: String::new(),
        }
    }

    /// Whether a download has completed and `upload` may re-send it.
    pub fn is_staged(&self) -> bool {
        self.staged
    }

    /// Total bytes of the most recently negotiated (or completed) download.
    pub fn total(&self) -> u32 {
        self.total
    }
}

impl Default for DownloadState {
    fn default() -> Self {
        Self::new()
    }
}

/// Handles `download:<arg>`.
///
/// `arg` is the hex ASCII size argument, already split from the `download:`
/// verb by [`crate::command::parse_command`].
pub fn begin(
    transport: &mut dyn Transport,
    cfg: &mut SessionConfig,
    state: &mut DownloadState,
    arg: &[u8],
) -> BeginOutcome {
    use crate::config::TransportKind;

    if arg.len() > DOWNLOAD_HEX_DIGITS {
        respond(transport, Prefix::Fail, b"Number error");
        return BeginOutcome::Rejected;
    }

    let Some(num_data_bytes) = hex::parse_hex(arg) else {
        respond(transport, Prefix::Fail, b"Number error");
        return BeginOutcome::Rejected;
    };

    if num_data_bytes == 0 {
        respond(transport, Prefix::Fail, b"Zero download size");
        return BeginOutcome::Rejected;
    }

    if num_data_bytes > cfg.hard_download_cap {
        respond(transport, Prefix::Fail, b"Not enough memory");
        return BeginOutcome::Rejected;
    }

    // The stage buffer is the real ceiling regardless of transport: a
    // misconfigured `hard_download_cap` larger than `stage_buffer` must not
    // be allowed to drive either path past the end of the buffer.
    if num_data_bytes as usize > cfg.stage_buffer.len() {
        respond(transport, Prefix::Fail, b"Not enough memory");
        return BeginOutcome::Rejected;
    }

    state.total = num_data_bytes;
    state.received = 0;
    state.size_ascii.clear();
    // arg.len() <= DOWNLOAD_HEX_DIGITS was just checked above, so this can't fail.
    let _ = state
        .size_ascii
        .push_str(core::str::from_utf8(arg).unwrap_or(""));

    respond(transport, Prefix::Data, arg);

    if transport.kind() != TransportKind::Spis {
        return BeginOutcome::AwaitingData;
    }

    // `num_data_bytes <= stage_buffer.len()` was just checked above, so this
    // slice is always in bounds.
    let got = transport.read_bulk(
        &mut cfg.stage_buffer[..num_data_bytes as usize],
        num_data_bytes,
    );
    if got != num_data_bytes {
        log::error!("failed to download full payload");
        respond(transport, Prefix::Fail, b"");
        return BeginOutcome::Completed { exit_after: false };
    }

    respond(transport, Prefix::Okay, b"");
    state.staged = true;
    BeginOutcome::Completed {
        exit_after: cfg.boot_stage.is_bl1(),
    }
}

/// Feeds one inbound block to an in-progress USB data phase.
///
/// `chunk_len` is the number of bytes the transport reports available; the
/// protocol says nothing about hosts sending extra data, so anything past
/// what's still expected is silently dropped, matching the original source.
///
/// Returns `true` once the download has fully landed (an `OKAY` has already
/// been sent in that case).
pub fn receive_chunk(
    transport: &mut dyn Transport,
    cfg: &mut SessionConfig,
    state: &mut DownloadState,
    chunk_len: u32,
) -> bool {
    let remaining = state.total - state.received;
    let n = (chunk_len.min(remaining)) as usize;
    let start = state.received as usize;
    transport.read_block(&mut cfg.stage_buffer[start..start + n], n);
    state.received += n as u32;

    // The host block may carry more bytes than the download still expects.
    // Those bytes must still be pulled off the wire — left unread, they'd sit
    // in the transport's queue and get misread as the start of the next
    // command — but they're discarded rather than staged.
    let mut surplus = (chunk_len as usize) - n;
    let mut scratch = [0u8; crate::len::COMMAND_SIZE];
    while surplus > 0 {
        let take = surplus.min(scratch.len());
        transport.read_block(&mut scratch[..take], take);
        surplus -= take;
    }

    if state.received >= state.total {
        respond(transport, Prefix::Okay, b"");
        state.staged = true;
        true
    } else {
        false
    }
}

/// Handles the `upload` verb.
///
/// Disabled outside debug builds and unconditionally in BL1 — the first
/// boot stage never hands staged collateral back to an external host.
pub fn handle_upload(transport: &mut dyn Transport, cfg: &SessionConfig, state: &DownloadState) {
    use crate::config::TransportKind;

    if cfg.boot_stage.is_bl1() || !cfg.debug_build {
        respond(transport, Prefix::Fail, b"Not supported");
        return;
    }

    if !state.staged {
        respond(transport, Prefix::Fail, b"");
        return;
    }

    respond(transport, Prefix::Data, state.size_ascii.as_bytes());

    for &b in &cfg.stage_buffer[..state.total as usize] {
        transport.write_byte(b);
    }
    if transport.kind() == TransportKind::Usb {
        transport.flush();
    }

    respond(transport, Prefix::Okay, b"");
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
        debug_build: bool,
        boot_stage: BootStage,
    ) -> SessionConfig<'a> {
        SessionConfig {
            serial_number: b"",
            stage_buffer,
            max_download_size: 8_388_608,
            hard_download_cap: 16_777_216,
            boot_stage,
            debug_build,
            secure_boot: false,
            recovery_signalled: false,
            partition_writer: writer,
            watchdog: wdt,
        }
    }

    #[test]
    fn begin_rejects_zero_size() {
        let mut stage = [0u8; 64];
        let mut writer = StubPartitionWriter;
        let mut wdt = NullWatchdog;
        let mut c = cfg(&mut stage, &mut writer, &mut wdt, true, BootStage::Bl2);
        let mut t = LoopbackTransport::new(TransportKind::Usb);
        let mut state = DownloadState::new();

        let outcome = begin(&mut t, &mut c, &mut state, b"00000000");
        assert_eq!(outcome, BeginOutcome::Rejected);
        assert_eq!(t.take_written(), b"FAILZero download size");
    }

    #[test]
    fn begin_rejects_over_cap() {
        let mut stage = [0u8; 64];
        let mut writer = StubPartitionWriter;
        let mut wdt = NullWatchdog;
        let mut c = cfg(&mut stage, &mut writer, &mut wdt, true, BootStage::Bl2);
        c.hard_download_cap = 16;
        let mut t = LoopbackTransport::new(TransportKind::Usb);
        let mut state = DownloadState::new();

        let outcome = begin(&mut t, &mut c, &mut state, b"00000020");
        assert_eq!(outcome, BeginOutcome::Rejected);
        assert_eq!(t.take_written(), b"FAILNot enough memory");
    }

    #[test]
    fn begin_rejects_size_exceeding_stage_buffer_even_under_hard_cap() {
        // A misconfigured `hard_download_cap` larger than the actual stage
        // buffer must not let either transport index past the buffer's end.
        let mut stage = [0u8; 16];
        let mut writer = StubPartitionWriter;
        let mut wdt = NullWatchdog;
        let mut c = cfg(&mut stage, &mut writer, &mut wdt, true, BootStage::Bl2);
        c.hard_download_cap = 16_777_216;
        let mut t = LoopbackTransport::new(TransportKind::Usb);
        let mut state = DownloadState::new();

        let outcome = begin(&mut t, &mut c, &mut state, b"00000020");
        assert_eq!(outcome, BeginOutcome::Rejected);
        assert_eq!(t.take_written(), b"FAILNot enough memory");
    }

    #[test]
    fn begin_rejects_bad_hex() {
        let mut stage = [0u8; 64];
        let mut writer = StubPartitionWriter;
        let mut wdt = NullWatchdog;
        let mut c = cfg(&mut stage, &mut writer, &mut wdt, true, BootStage::Bl2);
        let mut t = LoopbackTransport::new(TransportKind::Usb);
        let mut state = DownloadState::new();

        let outcome = begin(&mut t, &mut c, &mut state, b"0000zz00");
        assert_eq!(outcome, BeginOutcome::Rejected);
        assert_eq!(t.take_written(), b"FAILNumber error");
    }

    #[test]
    fn usb_download_full_round_trip() {
        let mut stage = [0u8; 64];
        let mut writer = StubPartitionWriter;
        let mut wdt = NullWatchdog;
        let mut c = cfg(&mut stage, &mut writer, &mut wdt, true, BootStage::Bl2);
        let mut t = LoopbackTransport::new(TransportKind::Usb);
        let mut state = DownloadState::new();

        let outcome = begin(&mut t, &mut c, &mut state, b"00000004");
        assert_eq!(outcome, BeginOutcome::AwaitingData);
        assert_eq!(t.take_written(), b"DATA00000004");

        t.push_block(&[0xDE, 0xAD, 0xBE, 0xEF]);
        let avail = t.availability();
        let done = receive_chunk(&mut t, &mut c, &mut state, avail);
        assert!(done);
        assert_eq!(t.take_written(), b"OKAY");
        assert!(state.is_staged());
        assert_eq!(&c.stage_buffer[..4], &[0xDE, 0xAD, 0xBE, 0xEF]);
    }

    #[test]
    fn receive_chunk_drains_surplus_bytes_past_total() {
        let mut stage = [0u8; 64];
        let mut writer = StubPartitionWriter;
        let mut wdt = NullWatchdog;
        let mut c = cfg(&mut stage, &mut writer, &mut wdt, true, BootStage::Bl2);
        let mut t = LoopbackTransport::new(TransportKind::Usb);
        let mut state = DownloadState::new();

        begin(&mut t, &mut c, &mut state, b"00000002");
        t.take_written();

        // The host sends a block larger than the remaining download size;
        // the extra bytes must not linger in the transport queue afterward.
        t.push_block(&[0xAA, 0xBB, 0xCC, 0xDD]);
        let avail = t.availability();
        let done = receive_chunk(&mut t, &mut c, &mut state, avail);
        assert!(done);
        assert_eq!(&c.stage_buffer[..2], &[0xAA, 0xBB]);
        assert_eq!(t.take_written(), b"OKAY");

        // No leftover bytes means the next availability() is whatever the
        // host sends next, not the unread tail of the surplus block.
        t.push_block(b"getvar:version");
        assert_eq!(t.availability(), b"getvar:version".len() as u32);
    }

    #[test]
    fn spis_download_completes_synchronously() {
        let mut stage = [0u8; 64];
        let mut writer = StubPartitionWriter;
        let mut wdt = NullWatchdog;
        let mut c = cfg(&mut stage, &mut writer, &mut wdt, true, BootStage::Bl1);
        let mut t = LoopbackTransport::new(TransportKind::Spis);
        t.set_bulk_source(&[1, 2, 3, 4]);
        let mut state = DownloadState::new();

        let outcome = begin(&mut t, &mut c, &mut state, b"00000004");
        assert_eq!(outcome, BeginOutcome::Completed { exit_after: true });
        let written = t.take_written();
        assert!(written.starts_with(b"DATA00000004"));
        assert!(written.ends_with(b"OKAY"));
    }

    #[test]
    fn upload_echoes_staged_data() {
        let mut stage = [0u8; 64];
        let mut writer = StubPartitionWriter;
        let mut wdt = NullWatchdog;
        let mut c = cfg(&mut stage, &mut writer, &mut wdt, true, BootStage::Bl2);
        let mut t = LoopbackTransport::new(TransportKind::Usb);
        let mut state = DownloadState::new();

        begin(&mut t, &mut c, &mut state, b"00000002");
        t.take_written();
        t.push_block(&[0xAA, 0xBB]);
        let avail = t.availability();
        receive_chunk(&mut t, &mut c, &mut state, avail);
        t.take_written();

        handle_upload(&mut t, &c, &state);
        let written = t.take_written();
        assert_eq!(written, b"DATA00000002\xAA\xBBOKAY");
    }

    #[test]
    fn upload_disabled_in_bl1() {
        let mut stage = [0u8; 64];
        let mut writer = StubPartitionWriter;
        let mut wdt = NullWatchdog;
        let c = cfg(&mut stage, &mut writer, &mut wdt, true, BootStage::Bl1);
        let mut t = LoopbackTransport::new(TransportKind::Usb);
        let state = DownloadState::new();

        handle_upload(&mut t, &c, &state);
        assert_eq!(t.take_written(), b"FAILNot supported");
    }
}
