use core::fmt;

use heapless::String;

/// Maximum length of an [`Error`] message.
///
/// Generous enough for any message this crate constructs (all of which are
/// built from short, static fragments), without needing `alloc`.
const ERROR_MESSAGE_LEN: usize = 96;

pub type Result<T> = core::result::Result<T, Error>;

/// Error codes for failures raised by this crate.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    /// Generic internal failure.
    Failure = 0,
    /// Caller supplied an invalid configuration or capability combination.
    InvalidArgument = 1,
    /// A transport-level operation failed (e.g. SPIS prep-response).
    Transport = 2,
}

impl From<ErrorCode> for &'static str {
    fn from(code: ErrorCode) -> Self {
        match code {
            ErrorCode::Failure => "failure",
            ErrorCode::InvalidArgument => "invalid argument",
            ErrorCode::Transport => "transport",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", <&'static str>::from(*self))
    }
}

/// Basic error type for session-level failures.
///
/// Unlike the wire-visible `FAIL<reason>` responses (see [`crate::framer::Reply`]),
/// values of this type never cross the Fastboot wire; they are returned from
/// the session entry point for configuration errors, or from external
/// collaborator traits ([`crate::config::PartitionWriter`], [`crate::config::Watchdog`]).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Error {
    code: ErrorCode,
    message: String<ERROR_MESSAGE_LEN>,
}

impl Error {
    /// Creates a generic failure [`Error`].
    pub fn failure(message: &str) -> Self {
        Self::new(ErrorCode::Failure, message)
    }

    /// Creates an invalid-argument [`Error`].
    pub fn invalid_argument(message: &str) -> Self {
        Self::new(ErrorCode::InvalidArgument, message)
    }

    /// Creates a transport [`Error`].
    pub fn transport(message: &str) -> Self {
        Self::new(ErrorCode::Transport, message)
    }

    fn new(code: ErrorCode, message: &str) -> Self {
        let mut buf = String::new();
        // Truncate rather than fail: an error message that doesn't fit is
        // still more useful shortened than dropped.
        let _ = buf.push_str(&message[..message.len().min(ERROR_MESSAGE_LEN)]);
        Self { code, message: buf }
    }

    /// Gets the error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Gets the error message.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = Error::invalid_argument("missing read_block capability");
        assert_eq!(err.code(), ErrorCode::InvalidArgument);
        assert_eq!(err.message(), "missing read_block capability");
        assert_eq!(
            alloc_free_format(&err),
            "invalid argument: missing read_block capability"
        );
    }

    fn alloc_free_format(err: &Error) -> String<160> {
        use core::fmt::Write;
        let mut s = String::new();
        write!(s, "{err}").unwrap();
        s
    }
}
