//! A [`Transport`] test double over in-memory queues.
//!
//! Available whenever the crate is built with `cfg(test)` or the `std`
//! feature; it plays the same role in this crate's test suite that the
//! teacher crate's `arbitrary`-derived fuzz targets play for its message
//! decoders — driving full session runs without real USB/SPI hardware.

use std::collections::VecDeque;
use std::vec::Vec;

use crate::config::TransportKind;
use crate::transport::Transport;

/// In-memory transport double.
///
/// The host side of a test pushes discrete blocks with
/// [`LoopbackTransport::push_block`] (mirroring how a real USB/SPI host
/// delivers one command or one data chunk at a time); `availability()`
/// reports the size of the next undelivered block, matching the real
/// protocol's framing.
pub struct LoopbackTransport {
    kind: TransportKind,
    inbound: VecDeque<Vec<u8>>,
    current: Option<(Vec<u8>, usize)>,
    outbound: Vec<u8>,
    flush_count: u32,
    prep_response_count: u32,
    prep_response_should_fail: bool,
    bulk_source: Option<Vec<u8>>,
}

impl LoopbackTransport {
    /// Creates a new loopback transport of the given kind, with no queued
    /// inbound data.
    pub fn new(kind: TransportKind) -> Self {
        Self {
            kind,
            inbound: VecDeque::new(),
            current: None,
            outbound: Vec::new(),
            flush_count: 0,
            prep_response_count: 0,
            prep_response_should_fail: false,
            bulk_source: None,
        }
    }

    /// Queues one inbound block, as if the host had just sent it.
    pub fn push_block(&mut self, block: &[u8]) {
        self.inbound.push_back(block.to_vec());
    }

    /// Queues the bytes a subsequent `read_bulk` call should hand back
    /// (SPIS only).
    pub fn set_bulk_source(&mut self, data: &[u8]) {
        self.bulk_source = Some(data.to_vec());
    }

    /// Makes the next `prep_response()` call report failure.
    pub fn fail_next_prep_response(&mut self) {
        self.prep_response_should_fail = true;
    }

    /// Drains and returns everything written so far.
    pub fn take_written(&mut self) -> Vec<u8> {
        core::mem::take(&mut self.outbound)
    }

    pub fn flush_count(&self) -> u32 {
        self.flush_count
    }

    pub fn prep_response_count(&self) -> u32 {
        self.prep_response_count
    }
}

impl Transport for LoopbackTransport {
    fn kind(&self) -> TransportKind {
        self.kind
    }

    fn availability(&mut self) -> u32 {
        if self.current.is_none() {
            self.current = self.inbound.pop_front().map(|b| (b, 0));
        }
        match &self.current {
            Some((block, pos)) => (block.len() - pos) as u32,
            None => 0,
        }
    }

    fn read_block(&mut self, dst: &mut [u8], n: usize) {
        let (block, pos) = self.current.as_mut().expect("read_block with nothing queued");
        let end = *pos + n;
        dst[..n].copy_from_slice(&block[*pos..end]);
        *pos = end;
        if *pos >= block.len() {
            self.current = None;
        }
    }

    fn write_byte(&mut self, b: u8) {
        self.outbound.push(b);
    }

    fn read_bulk(&mut self, dst_addr: &mut [u8], n: u32) -> u32 {
        let Some(src) = self.bulk_source.take() else {
            return 0;
        };
        let n = n as usize;
        let copy_len = n.min(src.len());
        dst_addr[..copy_len].copy_from_slice(&src[..copy_len]);
        copy_len as u32
    }

    fn flush(&mut self) {
        self.flush_count += 1;
    }

    fn prep_response(&mut self) -> Result<(), ()> {
        self.prep_response_count += 1;
        if core::mem::take(&mut self.prep_response_should_fail) {
            Err(())
        } else {
            Ok(())
        }
    }

    fn supports_read_bulk(&self) -> bool {
        true
    }

    fn supports_flush(&self) -> bool {
        true
    }

    fn supports_prep_response(&self) -> bool {
        true
    }
}
