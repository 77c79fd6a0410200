use std::{io, os::fd::RawFd};

use nix::fcntl::{fcntl, FcntlArg, OFlag};

/// A snapshot of a descriptor's file status flags, taken before the descriptor is forced into
/// non-blocking mode for the duration of a transfer. The original mode must be put back with
/// [BlockingMode::restore] on every exit path, there is deliberately no [Drop] impl since a failed
/// restore has to be reported to the caller.
pub(super) struct BlockingMode {
    fd: RawFd,
    original: OFlag,
}

impl BlockingMode {
    /// Capture the current mode of `fd` and switch it to non-blocking if it is not already.
    pub(super) fn force_nonblocking(fd: RawFd) -> nix::Result<BlockingMode> {
        let original = OFlag::from_bits_retain(fcntl(fd, FcntlArg::F_GETFL)?);
        if !original.contains(OFlag::O_NONBLOCK) {
            fcntl(fd, FcntlArg::F_SETFL(original | OFlag::O_NONBLOCK))?;
        }
        Ok(BlockingMode { fd, original })
    }

    pub(super) fn was_nonblocking(&self) -> bool {
        self.original.contains(OFlag::O_NONBLOCK)
    }

    /// Put the descriptor back into the mode it was in when captured.
    pub(super) fn restore(self) -> nix::Result<()> {
        if !self.was_nonblocking() {
            fcntl(self.fd, FcntlArg::F_SETFL(self.original))?;
        }
        Ok(())
    }
}

/// Whether `fd` currently has `O_NONBLOCK` set.
pub fn is_nonblocking(fd: RawFd) -> io::Result<bool> {
    let flags = OFlag::from_bits_retain(fcntl(fd, FcntlArg::F_GETFL)?);
    Ok(flags.contains(OFlag::O_NONBLOCK))
}

/// Switch `fd` in or out of non-blocking mode.
pub fn set_nonblocking(fd: RawFd, nonblocking: bool) -> io::Result<()> {
    let mut flags = OFlag::from_bits_retain(fcntl(fd, FcntlArg::F_GETFL)?);
    flags.set(OFlag::O_NONBLOCK, nonblocking);
    fcntl(fd, FcntlArg::F_SETFL(flags))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::os::fd::AsRawFd;

    use super::*;
    use crate::net::Socket;

    #[test]
    fn test_force_and_restore() {
        let (left, _right) = Socket::pair().unwrap();
        let fd = left.as_raw_fd();
        assert!(!is_nonblocking(fd).unwrap());

        let mode = BlockingMode::force_nonblocking(fd).unwrap();
        assert!(!mode.was_nonblocking());
        assert!(is_nonblocking(fd).unwrap());

        mode.restore().unwrap();
        assert!(!is_nonblocking(fd).unwrap());
    }

    #[test]
    fn test_already_nonblocking_is_left_alone() {
        let (left, _right) = Socket::pair().unwrap();
        let fd = left.as_raw_fd();
        set_nonblocking(fd, true).unwrap();

        let mode = BlockingMode::force_nonblocking(fd).unwrap();
        assert!(mode.was_nonblocking());
        mode.restore().unwrap();
        assert!(is_nonblocking(fd).unwrap());
    }

    #[test]
    fn test_bad_descriptor() {
        assert!(BlockingMode::force_nonblocking(-1).is_err());
        assert!(is_nonblocking(-1).is_err());
    }
}
