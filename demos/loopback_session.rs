//! Drives a full Fastboot session over [`mv_fastboot::test_support::LoopbackTransport`]
//! instead of real hardware, for poking at the protocol from a desk.
//!
//! ```sh
//! cargo run --bin loopback_session --features std
//! ```

use mv_fastboot::config::{BootStage, NullWatchdog, SessionConfig, StubPartitionWriter, TransportKind};
use mv_fastboot::dispatcher::Session;
use mv_fastboot::session::run_session;
use mv_fastboot::test_support::LoopbackTransport;

fn main() {
    env_logger::init();

    let mut stage_buffer = [0u8; 4096];
    let mut partition_writer = StubPartitionWriter;
    let mut watchdog = NullWatchdog;
    let mut cfg = SessionConfig {
        serial_number: b"\xCA\xFE\xBA\xBE",
        stage_buffer: &mut stage_buffer,
        max_download_size: 4096,
        hard_download_cap: 4096,
        boot_stage: BootStage::Bl2,
        debug_build: true,
        secure_boot: false,
        recovery_signalled: false,
        partition_writer: &mut partition_writer,
        watchdog: &mut watchdog,
    };

    let mut transport = LoopbackTransport::new(TransportKind::Usb);
    transport.push_block(b"getvar:product");
    transport.push_block(b"getvar:serialno");
    transport.push_block(b"download:00000008");
    transport.push_block(&[1, 2, 3, 4, 5, 6, 7, 8]);
    transport.push_block(b"flash:boot");
    transport.push_block(b"continue");

    let mut session = Session::new();
    run_session(&mut transport, &mut cfg, &mut session).expect("loopback transport satisfies USB capability set");

    let written = transport.take_written();
    println!(
        "device responses: {:?}",
        String::from_utf8_lossy(&written)
    );
}
