use std::{
    os::fd::{BorrowedFd, RawFd},
    time::{Duration, Instant},
};

use nix::{
    errno::Errno,
    poll::{poll, PollFd, PollFlags, PollTimeout},
    unistd,
};
use tracing::{debug, trace, warn};

use crate::{
    error::Status,
    flags::{Flag, FlagSet},
};

use super::{cancel::CancelSource, mode::BlockingMode, TransferConfig};

/// The direction of a transfer relative to the descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Read,
    Write,
}

/// The memory a transfer moves bytes into or out of.
pub enum Target<'b> {
    Read(&'b mut [u8]),
    Write(&'b [u8]),
}

impl<'b> Target<'b> {
    pub fn direction(&self) -> Direction {
        match self {
            Target::Read(_) => Direction::Read,
            Target::Write(_) => Direction::Write,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Target::Read(buf) => buf.len(),
            Target::Write(buf) => buf.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The result of one wait or transfer step.
enum Step {
    /// The descriptor is ready, attempt the transfer.
    Ready,
    /// Go back to waiting.
    Again,
    /// Stop with a final [Status].
    Done(Status),
}

/// Perform one cancellable, timeout bounded transfer of up to `target.len()` bytes between `fd`
/// and `target`. The number of bytes actually moved is written to `config.status` on every
/// outcome.
///
/// The descriptor is forced into non-blocking mode for the duration of the call and always put
/// back the way it was found, failing to do so turns the outcome into [Status::Fatal]. A negative
/// descriptor or an empty target is rejected with [Status::InvalidArgument] before anything is
/// touched.
pub fn transfer(fd: RawFd, target: Target<'_>, config: TransferConfig<'_>) -> Status {
    let TransferConfig {
        status: status_out,
        flags,
        timeout,
        sigmask,
    } = config;

    let direction = target.direction();
    let size = target.len();

    if fd < 0 || target.is_empty() {
        debug!(fd, ?direction, size, "rejecting transfer");
        if let Some(out) = status_out {
            *out = 0;
        }
        return Status::InvalidArgument;
    }

    debug!(fd, ?direction, size, ?flags, ?timeout, "starting transfer");

    let mode = match BlockingMode::force_nonblocking(fd) {
        Ok(mode) => mode,
        Err(err) => {
            debug!(fd, %err, "failed to capture blocking mode");
            if let Some(out) = status_out {
                *out = 0;
            }
            return Status::InvalidArgument;
        }
    };

    let mut transfer = Transfer {
        fd,
        target,
        flags,
        retry_would_block: flags.contains(Flag::RetryWouldBlock),
        deadline: deadline(timeout),
        total: 0,
    };

    let mut status = match sigmask.map(CancelSource::open).transpose() {
        Ok(mut cancel) => {
            let status = transfer.run(cancel.as_mut());
            match cancel.map(CancelSource::close) {
                Some(Err(err)) => {
                    warn!(fd, %err, "failed to restore signal mask");
                    Status::Fatal
                }
                _ => status,
            }
        }
        Err(err) => {
            debug!(fd, %err, "failed to open cancellation source");
            Status::InvalidArgument
        }
    };

    if let Err(err) = mode.restore() {
        warn!(fd, %err, "failed to restore blocking mode");
        status = Status::Fatal;
    }

    if let Some(out) = status_out {
        *out = transfer.total;
    }

    debug!(
        fd,
        ?direction,
        size,
        transferred = transfer.total,
        %status,
        "transfer finished"
    );
    status
}

fn deadline(timeout: Option<Duration>) -> Option<Instant> {
    // A timeout too large to represent is as good as none at all.
    timeout.and_then(|timeout| Instant::now().checked_add(timeout))
}

struct Transfer<'b> {
    fd: RawFd,
    target: Target<'b>,
    flags: FlagSet,
    retry_would_block: bool,
    deadline: Option<Instant>,
    total: usize,
}

impl<'b> Transfer<'b> {
    fn auto_retry(&self) -> bool {
        self.flags.contains(Flag::AutoRetry)
    }

    fn run(&mut self, mut cancel: Option<&mut CancelSource>) -> Status {
        loop {
            match self.wait(cancel.as_deref_mut()) {
                Step::Ready => {}
                Step::Again => continue,
                Step::Done(status) => return status,
            }

            // Anything short of a final status goes back through the wait.
            if let Step::Done(status) = self.attempt() {
                return status;
            }
        }
    }

    /// The poll timeout for the next wait, always measured against the fixed deadline so that
    /// repeated interruptions can not stretch the call past its budget.
    fn remaining(&self) -> PollTimeout {
        let deadline = match self.deadline {
            Some(deadline) => deadline,
            None => return PollTimeout::NONE,
        };

        let left = deadline.saturating_duration_since(Instant::now());
        let millis = left.as_nanos().div_ceil(1_000_000);
        i32::try_from(millis)
            .ok()
            .and_then(|millis| PollTimeout::try_from(millis).ok())
            .unwrap_or(PollTimeout::MAX)
    }

    /// Wait for either the descriptor or the cancellation source to become ready. Returns
    /// [Step::Ready] when the descriptor can be transferred on, and [Step::Again] when an
    /// interrupted wait is to be retried.
    fn wait(&mut self, cancel: Option<&mut CancelSource>) -> Step {
        let interest = match self.target.direction() {
            Direction::Read => PollFlags::POLLIN,
            Direction::Write => PollFlags::POLLOUT,
        };
        let timeout = self.remaining();
        trace!(fd = self.fd, total = self.total, "waiting for readiness");

        // SAFETY: The descriptor is owned by the caller and outlives this call.
        let fd = unsafe { BorrowedFd::borrow_raw(self.fd) };

        let polled = match cancel {
            Some(cancel) => {
                let polled = {
                    let mut fds = [
                        PollFd::new(fd, interest),
                        PollFd::new(cancel.as_fd(), PollFlags::POLLIN),
                    ];
                    poll(&mut fds, timeout).map(|ready| (ready, fds[0].revents(), fds[1].revents()))
                };
                polled.map(|(ready, revents, signalled)| {
                    let cancelled = signalled.is_some_and(|r| !r.is_empty());
                    (ready, revents, cancelled.then_some(cancel))
                })
            }
            None => {
                let mut fds = [PollFd::new(fd, interest)];
                poll(&mut fds, timeout).map(|ready| (ready, fds[0].revents(), None))
            }
        };

        match polled {
            Err(Errno::EINTR) => self.transient("wait interrupted"),
            Err(err) => {
                warn!(fd = self.fd, %err, "wait failed");
                Step::Done(Status::Fatal)
            }
            Ok((0, _, _)) => {
                debug!(fd = self.fd, total = self.total, "transfer timed out");
                Step::Done(Status::Timeout)
            }
            Ok((_, _, Some(cancel))) => {
                match cancel.acknowledge() {
                    Ok(info) => debug!(
                        fd = self.fd,
                        signal = info.map(|info| info.ssi_signo),
                        "transfer cancelled"
                    ),
                    Err(err) => debug!(fd = self.fd, %err, "failed to acknowledge signal"),
                }
                Step::Done(Status::SignalReceived)
            }
            Ok((_, revents, None)) => {
                let ready = interest | PollFlags::POLLHUP | PollFlags::POLLERR;
                if revents.is_some_and(|r| r.intersects(ready)) {
                    Step::Ready
                } else {
                    warn!(fd = self.fd, ?revents, "descriptor reported without readiness");
                    Step::Done(Status::Fatal)
                }
            }
        }
    }

    /// One non-blocking read or write over the part of the target not yet transferred.
    fn attempt(&mut self) -> Step {
        let offset = self.total;
        let direction = self.target.direction();
        let result = match &mut self.target {
            Target::Read(buf) => unistd::read(self.fd, &mut buf[offset..]),
            Target::Write(buf) => {
                // SAFETY: The descriptor is owned by the caller and outlives this call.
                let fd = unsafe { BorrowedFd::borrow_raw(self.fd) };
                unistd::write(fd, &buf[offset..])
            }
        };

        match result {
            Err(Errno::EINTR) => self.transient("transfer interrupted"),
            Err(Errno::EAGAIN) => {
                if self.auto_retry() || self.retry_would_block {
                    trace!(fd = self.fd, "transfer would block, retrying");
                    Step::Again
                } else {
                    Step::Done(Status::Retryable)
                }
            }
            Err(Errno::EFAULT) if direction == Direction::Read => Step::Done(Status::BufferFull),
            Err(err) => {
                warn!(fd = self.fd, ?direction, %err, "transfer failed");
                Step::Done(Status::Fatal)
            }
            Ok(0) if direction == Direction::Read => {
                debug!(fd = self.fd, total = self.total, "peer closed the stream");
                Step::Done(Status::Success)
            }
            Ok(n) => {
                self.total += n;
                trace!(fd = self.fd, n, total = self.total, "transferred");

                if self.total == self.target.len() {
                    match direction {
                        Direction::Read => Step::Done(Status::BufferFull),
                        Direction::Write => Step::Done(Status::Success),
                    }
                } else if self.auto_retry() {
                    Step::Again
                } else {
                    Step::Done(Status::Retryable)
                }
            }
        }
    }

    fn transient(&self, what: &'static str) -> Step {
        if self.auto_retry() {
            trace!(fd = self.fd, what, "retrying");
            Step::Again
        } else {
            debug!(fd = self.fd, what, total = self.total, "surfacing transient condition");
            Step::Done(Status::Retryable)
        }
    }
}
