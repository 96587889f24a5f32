use crate::config::TransportKind;

/// Unifies USB-bulk and SPI-slave byte pipes behind one capability set.
///
/// Implementations provide the required methods; the SPIS-only and USB-only
/// capabilities default to "not supported" so a USB transport need not stub
/// out `read_bulk`/`prep_response`, and vice versa for `flush`.
///
/// The actual USB enumeration/descriptor machinery and SPI-slave DMA
/// primitives are external collaborators: this trait only describes the
/// byte-pipe contract a real implementation (e.g. one built on `usb-device`)
/// would satisfy.
pub trait Transport {
    /// Which transport this is. Drives the handful of places C3/C6 need to
    /// select transport-specific behaviour.
    fn kind(&self) -> TransportKind;

    /// Bytes queued by the host but not yet consumed.
    ///
    /// May block internally but must return promptly with `0` when nothing
    /// is ready — the session driver polls this in a tight loop.
    fn availability(&mut self) -> u32;

    /// Copies exactly `n` bytes from the receive queue into `dst`.
    ///
    /// `n` is always obtained from [`Transport::availability`] (USB) or
    /// known a priori (SPIS); `dst` must be at least `n` bytes.
    fn read_block(&mut self, dst: &mut [u8], n: usize);

    /// Enqueues one outbound byte.
    fn write_byte(&mut self, b: u8);

    /// Single-shot DMA-style read of `n` bytes into `dst_addr`, returning the
    /// number of bytes actually read.
    ///
    /// SPIS only. The default implementation returns `0`, signalling "not
    /// supported"; USB transports need not override it.
    fn read_bulk(&mut self, _dst_addr: &mut [u8], _n: u32) -> u32 {
        0
    }

    /// Pushes queued bytes out on the IN endpoint.
    ///
    /// USB only. Default no-op; SPIS transports need not override it.
    fn flush(&mut self) {}

    /// Arms the SPI-slave for a response frame.
    ///
    /// SPIS only. Default `Ok(())`; USB transports need not override it.
    fn prep_response(&mut self) -> Result<(), ()> {
        Ok(())
    }

    /// Whether this transport actually implements [`Transport::read_bulk`].
    ///
    /// `read_bulk` can't be distinguished from "genuinely reads zero bytes"
    /// by its return value alone, so the session driver's capability check
    /// (see [`crate::session::run_session`]) asks this instead. SPIS
    /// transports must override it to `true`; the default `false` is
    /// correct for USB transports, which never call it.
    fn supports_read_bulk(&self) -> bool {
        false
    }

    /// Whether this transport actually implements [`Transport::flush`].
    ///
    /// USB transports must override it to `true`; the default `false` is
    /// correct for SPIS transports, which never call it.
    fn supports_flush(&self) -> bool {
        false
    }

    /// Whether this transport actually implements [`Transport::prep_response`].
    ///
    /// SPIS transports must override it to `true`; the default `false` is
    /// correct for USB transports, which never call it.
    fn supports_prep_response(&self) -> bool {
        false
    }
}
