use std::{fmt, time::Duration};

use nix::sys::signal::SigSet;

use crate::flags::{Flag, FlagSet};

/// The configuration of a single socket transfer.
///
/// Defaults, as produced by [TransferConfig::read] and [TransferConfig::write]:
/// - `status`: no status-out, the transferred byte count is only logged.
/// - `flags`: [Flag::AutoRetry] for writes, nothing for reads.
/// - `timeout`: [None], wait for as long as it takes.
/// - `sigmask`: [None], the transfer can not be cancelled.
///
/// ```
/// use std::time::Duration;
///
/// use libsio::net::TransferConfig;
///
/// let mut transferred = 0;
/// let config = TransferConfig::read()
///     .status(&mut transferred)
///     .timeout(Duration::from_secs(5));
/// assert_eq!(config.timeout, Some(Duration::from_secs(5)));
/// ```
pub struct TransferConfig<'a> {
    /// Receives the number of bytes transferred, on every outcome.
    pub status: Option<&'a mut usize>,
    pub flags: FlagSet,
    /// The overall budget for the transfer, measured from the start of the call.
    pub timeout: Option<Duration>,
    /// Signals that cancel the transfer while it waits.
    pub sigmask: Option<&'a SigSet>,
}

impl<'a> TransferConfig<'a> {
    /// The default configuration for a read.
    pub fn read() -> TransferConfig<'a> {
        TransferConfig {
            status: None,
            flags: FlagSet::default(),
            timeout: None,
            sigmask: None,
        }
    }

    /// The default configuration for a write.
    pub fn write() -> TransferConfig<'a> {
        TransferConfig {
            flags: FlagSet::from(Flag::AutoRetry),
            ..TransferConfig::read()
        }
    }

    pub fn status(mut self, status: &'a mut usize) -> TransferConfig<'a> {
        self.status = Some(status);
        self
    }

    pub fn flags(mut self, flags: FlagSet) -> TransferConfig<'a> {
        self.flags = flags;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> TransferConfig<'a> {
        self.timeout = Some(timeout);
        self
    }

    /// Set the timeout in whole seconds, any negative value means no timeout.
    pub fn timeout_secs(mut self, secs: i64) -> TransferConfig<'a> {
        self.timeout = u64::try_from(secs).ok().map(Duration::from_secs);
        self
    }

    pub fn sigmask(mut self, sigmask: &'a SigSet) -> TransferConfig<'a> {
        self.sigmask = Some(sigmask);
        self
    }
}

impl<'a> fmt::Debug for TransferConfig<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferConfig")
            .field("status", &self.status.is_some())
            .field("flags", &self.flags)
            .field("timeout", &self.timeout)
            .field("sigmask", &self.sigmask.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let read = TransferConfig::read();
        assert!(read.flags.is_empty());
        assert!(read.status.is_none());
        assert!(read.timeout.is_none());
        assert!(read.sigmask.is_none());

        let write = TransferConfig::write();
        assert!(write.flags.contains(Flag::AutoRetry));
        assert!(write.timeout.is_none());
    }

    #[test]
    fn test_timeout_secs() {
        assert_eq!(
            TransferConfig::read().timeout_secs(3).timeout,
            Some(Duration::from_secs(3))
        );
        assert_eq!(
            TransferConfig::read().timeout_secs(0).timeout,
            Some(Duration::ZERO)
        );
        assert_eq!(TransferConfig::read().timeout_secs(-1).timeout, None);
    }
}
