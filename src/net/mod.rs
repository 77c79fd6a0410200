//! The [self] package implements the socket transfer engine. A transfer moves up to a [Buffer]'s
//! worth of bytes between a descriptor and the buffer, and is bounded in three ways:
//! - A deadline, after which the transfer stops with [Status::Timeout].
//! - An optional signal mask, any signal in it stops the transfer with [Status::SignalReceived].
//! - The [crate::flags::Flag::AutoRetry] flag, which decides whether transient conditions are
//!   retried internally or surfaced as [Status::Retryable].
//!
//! Every transfer waits with a single `poll` over the descriptor and a `signalfd` built from the
//! signal mask, so a signal can never slip in between checking for cancellation and starting to
//! wait. The descriptor is switched to non-blocking mode for the duration of the call, and always
//! restored afterwards.
//!
//! ```no_run
//! use libsio::{buffer::Buffer, error::Status, net::{Socket, TransferConfig}};
//!
//! let (mut left, mut right) = Socket::pair().unwrap();
//!
//! let status = left.write_from(&Buffer::from(&b"hello"[..]), TransferConfig::write());
//! assert_eq!(status, Status::Success);
//!
//! let mut buf = Buffer::zeroed(1024).unwrap();
//! let mut read = 0;
//! let status = right.read_into(&mut buf, TransferConfig::read().timeout_secs(5).status(&mut read));
//! assert_eq!(status, Status::Retryable);
//! assert_eq!(&buf.as_slice()[..read], b"hello");
//! ```

mod cancel;
mod config;
mod engine;
mod mode;
mod socket;
mod stream;

use std::os::fd::RawFd;

use crate::{buffer::Buffer, error::Status};

pub use config::TransferConfig;
pub use engine::{transfer, Direction, Target};
pub use mode::{is_nonblocking, set_nonblocking};
pub use stream::Socket;

/// Read up to `buf.len()` bytes from `fd` into `buf`.
///
/// A read that fills the buffer exactly reports [Status::BufferFull], the same as a read offered
/// more data than fits, so callers tell the two apart by the byte count written to the status-out
/// field. An orderly end of stream reports [Status::Success] with however many bytes arrived
/// before it. A buffer without storage is a [Status::InvalidArgument].
pub fn socket_read(fd: RawFd, buf: &mut Buffer, config: TransferConfig<'_>) -> Status {
    transfer(fd, Target::Read(buf.as_mut_slice()), config)
}

/// Write the whole of `buf` to `fd`, reporting [Status::Success] once every byte is written. A
/// buffer without storage is a [Status::InvalidArgument].
pub fn socket_write(fd: RawFd, buf: &Buffer, config: TransferConfig<'_>) -> Status {
    transfer(fd, Target::Write(buf.as_slice()), config)
}
