//! # libsio
//!
//! This is a small synchronous socket I/O library for linux, built around a single primitive: a
//! cancellable, timeout bounded, retry controlled transfer between a descriptor and a buffer. It
//! is not an event loop, each transfer suspends the calling thread until it reaches a final
//! [error::Status]. The package is split up into a handful of modules each handling a specific
//! subset of the functionality needed:
//!
//! - [flags] the [flags::FlagSet] bit set used to configure transfers.
//! - [buffer] the [buffer::Buffer] and [buffer::Bag] memory model that feeds them.
//! - [net] the transfer engine itself, plus the [net::Socket] convenience wrapper.
//! - [error] the status taxonomy shared by all of the above.
//!
//! A simple exchange over a connected pair of sockets looks like this:
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use libsio::{
//!     buffer::{Bag, Buffer},
//!     error::Status,
//!     flags::{Flag, FlagSet},
//!     net::{Socket, TransferConfig},
//! };
//!
//! let (mut client, mut server) = Socket::pair().unwrap();
//!
//! // Assemble the request out of a few independently allocated chunks.
//! let mut bag = Bag::new();
//! bag.place(&Buffer::from(&b"Hello "[..])).unwrap();
//! bag.place(&Buffer::from(&b"from client!"[..])).unwrap();
//! let request = bag.flatten().unwrap();
//!
//! let status = client.write_from(&request, TransferConfig::write());
//! assert_eq!(status, Status::Success);
//!
//! // Wait at most five seconds for the whole request to arrive.
//! let mut buf = Buffer::zeroed(request.len()).unwrap();
//! let mut read = 0;
//! let status = server.read_into(
//!     &mut buf,
//!     TransferConfig::read()
//!         .flags(FlagSet::new(&[Flag::AutoRetry]))
//!         .timeout(Duration::from_secs(5))
//!         .status(&mut read),
//! );
//!
//! // The buffer was sized to the request, so it comes back exactly full.
//! assert_eq!(status, Status::BufferFull);
//! println!("Client request: {}", String::from_utf8_lossy(&buf.as_slice()[..read]));
//! ```

pub mod bits;
pub mod buffer;
pub mod error;
pub mod flags;
pub mod net;

pub use buffer::{Bag, Buffer};
pub use error::{Error, Result, Status};
pub use flags::{Flag, FlagSet};
pub use net::{socket_read, socket_write, Socket, TransferConfig};
