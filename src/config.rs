use core::fmt;

use crate::error::Result;

/// Which ARM-Trusted-Firmware-style boot stage this session is running in.
///
/// Replaces the original source's compile-time `#if IMAGE_BL1` / `#if
/// IMAGE_MA2X8X` ladder with a runtime field the embedder sets once, per
/// build.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BootStage {
    Bl1,
    Bl2,
    Bl31,
    Bl32,
    Bl33,
    /// The platform's top-level application image selector.
    Ma2x8x,
}

impl BootStage {
    /// Is this the first-stage ROM?
    ///
    /// `upload`, non-forced `reboot`, and the single-shot `continue`-on-download
    /// rule all key off this.
    pub fn is_bl1(&self) -> bool {
        matches!(self, Self::Bl1)
    }
}

impl From<BootStage> for &'static str {
    fn from(stage: BootStage) -> Self {
        match stage {
            BootStage::Bl1 => "bl1",
            BootStage::Bl2 => "bl2",
            BootStage::Bl31 => "bl31",
            BootStage::Bl32 => "bl32",
            BootStage::Bl33 => "bl33",
            BootStage::Ma2x8x => "ma2x8x",
        }
    }
}

impl fmt::Display for BootStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", <&'static str>::from(*self))
    }
}

/// Which byte-pipe this session is running over.
///
/// The session driver consults this only where USB and SPIS genuinely
/// differ in behaviour (response padding/flush, download completion) — the
/// rest of the state machine is transport-agnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportKind {
    Usb,
    Spis,
}

/// External collaborator: writes a downloaded image to a named partition.
///
/// The core dispatches to this by partition name; actually touching flash
/// storage is outside this crate's scope.
pub trait PartitionWriter {
    /// Writes `data` (the first `len` bytes of the stage buffer) to `partition`.
    fn write(&mut self, partition: &str, data: &[u8]) -> Result<()>;
}

/// A [`PartitionWriter`] that performs no write and always succeeds.
///
/// The original C source's `flash:boot` handler busy-delays for ten seconds
/// and then reports success without writing anything — clearly a
/// placeholder. This type reproduces that "succeed without writing"
/// placeholder behaviour, but as an explicit opt-in rather than the silent
/// default: a caller must name `StubPartitionWriter` to get it.
#[derive(Default)]
pub struct StubPartitionWriter;

impl PartitionWriter for StubPartitionWriter {
    fn write(&mut self, _partition: &str, _data: &[u8]) -> Result<()> {
        Ok(())
    }
}

/// External collaborator: the hardware watchdog countdown register.
pub trait Watchdog {
    /// Refreshes the watchdog with the given timeout (in the platform's
    /// native tick units). A timeout of `0` forces an immediate reset.
    fn refresh(&mut self, timeout: u32);

    /// The platform's default watchdog reset timeout, in the same tick
    /// units as [`Watchdog::refresh`].
    ///
    /// The dispatcher tickles the watchdog with half of this value after the
    /// first completed command.
    fn default_timeout(&self) -> u32;
}

/// A [`Watchdog`] that does nothing.
///
/// Useful for host-side test harnesses and the loopback demo, where there is
/// no hardware watchdog to tickle.
#[derive(Default)]
pub struct NullWatchdog;

impl Watchdog for NullWatchdog {
    fn refresh(&mut self, _timeout: u32) {}

    fn default_timeout(&self) -> u32 {
        0
    }
}

/// Configuration supplied by the caller for one session.
///
/// Read-only for the session itself; the only mutation the session performs
/// is through `stage_buffer` and the `partition_writer`/`watchdog`
/// collaborators.
pub struct SessionConfig<'a> {
    /// Device serial number, or an empty slice if unsupported.
    pub serial_number: &'a [u8],
    /// Staging buffer the download engine writes into.
    pub stage_buffer: &'a mut [u8],
    /// Advertised `max-download-size` getvar value.
    pub max_download_size: u32,
    /// Hard cap enforced regardless of `max_download_size`
    /// (`SOC_FIP_MAX_SIZE` in the original source).
    pub hard_download_cap: u32,
    /// Which boot stage this session is running in.
    pub boot_stage: BootStage,
    /// Mirrors the original source's `DEBUG` build flag; gates `upload`
    /// outside BL1.
    pub debug_build: bool,
    /// SoC secure-boot flag register value.
    pub secure_boot: bool,
    /// SoC recovery-signalled flag register value.
    pub recovery_signalled: bool,
    /// Partition-write collaborator for `flash:<partition>`.
    pub partition_writer: &'a mut dyn PartitionWriter,
    /// Watchdog collaborator for the tickle-on-first-command and
    /// zero-timeout-on-reboot idiom.
    pub watchdog: &'a mut dyn Watchdog,
}

/// Fastboot protocol version this crate implements.
pub const PROTOCOL_VERSION: &str = "0.4";
/// Reported bootloader version string.
pub const BOOTLOADER_VERSION: &str = "1.0";
/// Reported baseband version string (no baseband on this platform).
pub const BASEBAND_VERSION: &str = "N/A";
/// Reported product string.
///
/// TODO: move this, and the version strings above, into the board-level
/// configuration once more than one SoC variant ships through this crate.
pub const PRODUCT: &str = "Intel Movidius Keembay 3xxx";
