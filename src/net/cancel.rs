use std::os::fd::{AsFd, BorrowedFd};

use nix::sys::{
    signal::{SigSet, SigmaskHow},
    signalfd::{siginfo, SfdFlags, SignalFd},
};

/// The cancellation side of a transfer. The signal mask is materialized as a `signalfd` so that
/// the transfer can wait on "descriptor ready" and "cancellation requested" with a single poll.
///
/// The mask is blocked on the calling thread while the source is open, a signal only shows up on
/// the `signalfd` while it is blocked, and this is also what makes a signal that was already
/// pending before the wait started visible to the first poll.
pub(super) struct CancelSource {
    fd: SignalFd,
    previous: SigSet,
}

impl CancelSource {
    pub(super) fn open(mask: &SigSet) -> nix::Result<CancelSource> {
        let previous = mask.thread_swap_mask(SigmaskHow::SIG_BLOCK)?;

        match SignalFd::with_flags(mask, SfdFlags::SFD_NONBLOCK | SfdFlags::SFD_CLOEXEC) {
            Ok(fd) => Ok(CancelSource { fd, previous }),
            Err(err) => {
                let _ = previous.thread_set_mask();
                Err(err)
            }
        }
    }

    pub(super) fn as_fd(&self) -> BorrowedFd<'_> {
        self.fd.as_fd()
    }

    /// Consume one pending signal so it is not delivered again once the mask is restored.
    pub(super) fn acknowledge(&mut self) -> nix::Result<Option<siginfo>> {
        self.fd.read_signal()
    }

    /// Close the `signalfd` and put the thread's signal mask back the way it was found.
    pub(super) fn close(self) -> nix::Result<()> {
        let CancelSource { fd, previous } = self;
        drop(fd);
        previous.thread_set_mask()
    }
}
