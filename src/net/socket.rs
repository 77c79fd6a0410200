use std::{io, os::fd::OwnedFd};

use nix::sys::socket::{socketpair, AddressFamily, SockFlag, SockType};

/// Create a pair of connected `AF_UNIX` stream sockets, both in blocking mode.
pub(super) fn stream_pair() -> io::Result<(OwnedFd, OwnedFd)> {
    socketpair(
        AddressFamily::Unix,
        SockType::Stream,
        None,
        SockFlag::SOCK_CLOEXEC,
    )
    .map_err(io::Error::from)
}
