use std::{
    io,
    net::TcpStream,
    os::{
        fd::{AsFd, AsRawFd, BorrowedFd, OwnedFd, RawFd},
        unix::net::UnixStream,
    },
};

use crate::{buffer::Buffer, error::Status};

use super::{is_nonblocking, set_nonblocking, socket, socket_read, socket_write, TransferConfig};

/// A [Socket] owns a bidirectional descriptor and runs transfers over it. Any stream descriptor
/// works, there are conversions from [OwnedFd], [UnixStream] and [TcpStream], and [Socket::pair]
/// creates a connected pair of local sockets.
///
/// Transfers take `&mut self` since a descriptor must not be used by another thread while a
/// transfer on it is in progress.
#[derive(Debug)]
pub struct Socket {
    fd: OwnedFd,
}

impl Socket {
    /// Create a pair of connected local stream sockets.
    pub fn pair() -> io::Result<(Socket, Socket)> {
        socket::stream_pair().map(|(left, right)| (Socket::from(left), Socket::from(right)))
    }

    /// Read up to `buf.len()` bytes into the given buffer, see [socket_read].
    pub fn read_into(&mut self, buf: &mut Buffer, config: TransferConfig<'_>) -> Status {
        socket_read(self.fd.as_raw_fd(), buf, config)
    }

    /// Write the contents of the given buffer, see [socket_write].
    pub fn write_from(&mut self, buf: &Buffer, config: TransferConfig<'_>) -> Status {
        socket_write(self.fd.as_raw_fd(), buf, config)
    }

    pub fn is_nonblocking(&self) -> io::Result<bool> {
        is_nonblocking(self.fd.as_raw_fd())
    }

    pub fn set_nonblocking(&self, nonblocking: bool) -> io::Result<()> {
        set_nonblocking(self.fd.as_raw_fd(), nonblocking)
    }
}

impl From<OwnedFd> for Socket {
    fn from(fd: OwnedFd) -> Self {
        Socket { fd }
    }
}

impl From<UnixStream> for Socket {
    fn from(stream: UnixStream) -> Self {
        Socket::from(OwnedFd::from(stream))
    }
}

impl From<TcpStream> for Socket {
    fn from(stream: TcpStream) -> Self {
        Socket::from(OwnedFd::from(stream))
    }
}

impl From<Socket> for OwnedFd {
    fn from(socket: Socket) -> Self {
        socket.fd
    }
}

impl AsRawFd for Socket {
    fn as_raw_fd(&self) -> RawFd {
        self.fd.as_raw_fd()
    }
}

impl AsFd for Socket {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.fd.as_fd()
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use super::*;
    use crate::flags::Flag;

    #[test]
    fn test_over_tcp() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let mut client = Socket::from(TcpStream::connect(addr).unwrap());
        let (server, _) = listener.accept().unwrap();
        let mut server = Socket::from(server);

        let status = client.write_from(&Buffer::from(&b"ping"[..]), TransferConfig::write());
        assert_eq!(status, Status::Success);

        let mut buf = Buffer::zeroed(4).unwrap();
        let status = server.read_into(
            &mut buf,
            TransferConfig::read().flags(Flag::AutoRetry.into()),
        );
        assert_eq!(status, Status::BufferFull);
        assert_eq!(buf.as_slice(), b"ping");
    }

    #[test]
    fn test_from_unix_stream() {
        let (left, right) = UnixStream::pair().unwrap();
        let mut left = Socket::from(left);
        let mut right = Socket::from(right);

        left.write_from(&Buffer::from(&b"x"[..]), TransferConfig::write());
        let mut buf = Buffer::zeroed(1).unwrap();
        assert_eq!(
            right.read_into(&mut buf, TransferConfig::read()),
            Status::BufferFull
        );

        let fd: OwnedFd = right.into();
        assert!(fd.as_raw_fd() >= 0);
    }
}
