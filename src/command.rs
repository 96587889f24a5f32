use crate::len::COMMAND_SIZE;

/// A recognised Fastboot verb, together with its argument (if any).
///
/// `arg` slices borrow directly from the command block — the parser does no
/// copying.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verb<'a> {
    GetVar(&'a str),
    Download(&'a [u8]),
    Upload,
    Flash(&'a str),
    /// `erase` is always refused regardless of its argument (see
    /// [`crate::dispatcher::dispatch_command`]), so unlike `flash` it
    /// carries no partition name.
    Erase,
    Boot,
    Continue,
    Reboot,
    RebootBootloader,
}

/// Why a command block was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseError {
    /// The block was larger than [`COMMAND_SIZE`] bytes.
    TooLarge,
    /// The leading byte looked like a command (lowercase ASCII) but no verb matched.
    UnrecognisedLowercase,
    /// No verb matched and the leading byte didn't look like a command at all.
    Unrecognised,
}

/// Size of [`FuzzCommandBlock::bytes`]: larger than [`COMMAND_SIZE`] so the
/// `TooLarge` branch of [`parse_command`] stays reachable from a generated
/// length, not just the in-bounds ones.
#[cfg(feature = "arbitrary")]
const FUZZ_BLOCK_CAP: usize = COMMAND_SIZE + 16;

/// A fixed-size, `Arbitrary`-derived stand-in for one inbound command block.
///
/// Mirrors the teacher crate's `OmnibusReply`, which derives `Arbitrary`
/// directly on a `buf: [u8; N]` struct so the fuzzer explores the exact
/// fixed-width space a real message occupies. Here the fuzzer gets a block
/// of plausible command bytes plus an independent claimed length, instead of
/// the fully unstructured `&[u8]` the `fuzz_hex` target uses — worthwhile
/// for `parse_command` because the oversized-block path only triggers when
/// length and content vary independently.
#[cfg(feature = "arbitrary")]
#[derive(Clone, Copy, Debug, arbitrary::Arbitrary)]
pub struct FuzzCommandBlock {
    bytes: [u8; FUZZ_BLOCK_CAP],
    len: u8,
}

#[cfg(feature = "arbitrary")]
impl FuzzCommandBlock {
    /// The block truncated to its claimed length, modulo the backing
    /// array's size so every length in `0..=FUZZ_BLOCK_CAP` is reachable.
    pub fn as_slice(&self) -> &[u8] {
        let n = self.len as usize % (FUZZ_BLOCK_CAP + 1);
        &self.bytes[..n]
    }
}

fn strip<'a>(block: &'a [u8], verb: &[u8]) -> Option<&'a [u8]> {
    if block.len() >= verb.len() && block[..verb.len()] == *verb {
        Some(&block[verb.len()..])
    } else {
        None
    }
}

fn to_str(b: &[u8]) -> &str {
    core::str::from_utf8(b).unwrap_or("")
}

/// Recognises the command verb table and splits verb from argument.
///
/// `block` is the raw inbound bytes, *without* the trailing NUL the original
/// C source appends for string-handling convenience — Rust slices carry
/// their own length, so that NUL would be redundant here.
///
/// Matching is by byte prefix, not exact match: a block like `b"bootXYZ"`
/// still matches the `boot` verb, reproducing the original `PARSE` macro's
/// `strncmp`-by-verb-length semantics.
pub fn parse_command(block: &[u8]) -> Result<Verb<'_>, ParseError> {
    if block.len() > COMMAND_SIZE {
        return Err(ParseError::TooLarge);
    }

    if let Some(arg) = strip(block, b"getvar:") {
        return Ok(Verb::GetVar(to_str(arg)));
    }
    if let Some(arg) = strip(block, b"download:") {
        return Ok(Verb::Download(arg));
    }
    if strip(block, b"upload").is_some() {
        return Ok(Verb::Upload);
    }
    if let Some(arg) = strip(block, b"flash:") {
        return Ok(Verb::Flash(to_str(arg)));
    }
    if strip(block, b"erase").is_some() {
        return Ok(Verb::Erase);
    }
    if strip(block, b"boot").is_some() {
        return Ok(Verb::Boot);
    }
    if strip(block, b"continue").is_some() {
        return Ok(Verb::Continue);
    }
    if strip(block, b"reboot").is_some() {
        if strip(block, b"reboot-bootloader").is_some() {
            return Ok(Verb::RebootBootloader);
        }
        return Ok(Verb::Reboot);
    }

    match block.first() {
        Some(&c) if c.is_ascii_lowercase() => Err(ParseError::UnrecognisedLowercase),
        _ => Err(ParseError::Unrecognised),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn getvar_splits_verb_and_arg() {
        assert_eq!(parse_command(b"getvar:version"), Ok(Verb::GetVar("version")));
        assert_eq!(
            parse_command(b"getvar:max-download-size"),
            Ok(Verb::GetVar("max-download-size"))
        );
    }

    #[test]
    fn download_arg_is_raw_bytes() {
        assert_eq!(
            parse_command(b"download:00000004"),
            Ok(Verb::Download(b"00000004"))
        );
    }

    #[test]
    fn no_arg_verbs() {
        assert_eq!(parse_command(b"upload"), Ok(Verb::Upload));
        assert_eq!(parse_command(b"boot"), Ok(Verb::Boot));
        assert_eq!(parse_command(b"continue"), Ok(Verb::Continue));
    }

    #[test]
    fn reboot_vs_reboot_bootloader() {
        assert_eq!(parse_command(b"reboot"), Ok(Verb::Reboot));
        assert_eq!(
            parse_command(b"reboot-bootloader"),
            Ok(Verb::RebootBootloader)
        );
    }

    #[test]
    fn flash_arg() {
        assert_eq!(parse_command(b"flash:boot"), Ok(Verb::Flash("boot")));
    }

    #[test]
    fn erase_matches_bare_verb_with_or_without_argument() {
        // The original doesn't need a `:` separator for `erase` since the
        // argument is never inspected; both forms must be recognised.
        assert_eq!(parse_command(b"erase"), Ok(Verb::Erase));
        assert_eq!(parse_command(b"erase:system"), Ok(Verb::Erase));
    }

    #[test]
    fn too_large_block() {
        let block = [b'a'; 80];
        assert_eq!(parse_command(&block), Err(ParseError::TooLarge));
    }

    #[test]
    fn unrecognised_lowercase_vs_other() {
        assert_eq!(
            parse_command(b"unknowncmd"),
            Err(ParseError::UnrecognisedLowercase)
        );
        assert_eq!(parse_command(b"!@#$"), Err(ParseError::Unrecognised));
        assert_eq!(parse_command(b""), Err(ParseError::Unrecognised));
    }
}
