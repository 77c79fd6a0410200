use std::fmt;

/// The outcome of a single socket transfer, and the reporting taxonomy for every other operation
/// in the crate.
///
/// Note that only [Status::Success] means the transfer completed as requested, every other status
/// is accompanied by a byte count through the transfer's status-out field which may be non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// The transfer completed, or the peer closed the stream in an orderly fashion.
    Success,
    /// The caller violated the operation's contract, nothing was touched.
    InvalidArgument,
    /// An unexpected OS level failure, including failing to restore the blocking mode.
    Fatal,
    /// A transient condition was surfaced instead of being retried internally.
    Retryable,
    /// The deadline passed before the transfer completed.
    Timeout,
    /// A signal in the cancellation mask was received while waiting.
    SignalReceived,
    /// A read filled the buffer exactly, or more data was offered than the buffer can hold.
    BufferFull,
}

impl Status {
    pub fn is_success(&self) -> bool {
        matches!(self, Status::Success)
    }

    /// Whether re-invoking the same transfer could make further progress.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Status::Retryable | Status::Timeout | Status::SignalReceived
        )
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Success => "success",
            Status::InvalidArgument => "invalid argument",
            Status::Fatal => "fatal",
            Status::Retryable => "retryable",
            Status::Timeout => "timeout",
            Status::SignalReceived => "signal received",
            Status::BufferFull => "buffer full",
        };
        f.write_str(s)
    }
}
