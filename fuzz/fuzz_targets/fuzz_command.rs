#![no_main]

use libfuzzer_sys::fuzz_target;

use mv_fastboot::command::{parse_command, FuzzCommandBlock, ParseError};
use mv_fastboot::len::COMMAND_SIZE;

fuzz_target!(|block: FuzzCommandBlock| {
    let slice = block.as_slice();

    // Must never panic, regardless of what garbage a host sends, and must
    // never accept a block past the fixed command-buffer size.
    match parse_command(slice) {
        Ok(_) => assert!(slice.len() <= COMMAND_SIZE),
        Err(ParseError::TooLarge) => assert!(slice.len() > COMMAND_SIZE),
        Err(_) => {}
    }
});
