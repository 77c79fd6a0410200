use std::fmt;

use crate::error::{Error, Result};

use super::{allocate, free_with, release};

/// A single contiguous owned byte region. A [Buffer] of size zero owns no storage at all, which is
/// what the socket transfers in [crate::net] reject as an invalid argument.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Buffer {
    storage: Option<Box<[u8]>>,
}

impl Buffer {
    /// Create a new [Buffer] of `size` zeroed bytes. A negative size is an
    /// [Error::InvalidArgument], and a size of zero yields an empty buffer without storage.
    pub fn create(size: isize) -> Result<Buffer> {
        let size = usize::try_from(size).map_err(|_| Error::InvalidArgument("negative size"))?;
        Buffer::zeroed(size)
    }

    /// Create a new [Buffer] of `size` zeroed bytes, reporting allocation failure as an error.
    pub fn zeroed(size: usize) -> Result<Buffer> {
        Ok(Buffer {
            storage: allocate(size)?,
        })
    }

    pub fn empty() -> Buffer {
        Buffer::default()
    }

    pub fn len(&self) -> usize {
        self.storage.as_ref().map_or(0, |s| s.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_storage(&self) -> bool {
        self.storage.is_some()
    }

    pub fn as_slice(&self) -> &[u8] {
        self.storage.as_deref().unwrap_or_default()
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        self.storage.as_deref_mut().unwrap_or_default()
    }

    /// Trim this buffer in place to the bytes after the first `n`, which is how the
    /// [crate::flags::Flag::UpdateInput] behavior hands callers the unconsumed remainder.
    /// Consuming every byte leaves an empty buffer without storage.
    pub fn consume(&mut self, n: usize) -> Result<()> {
        let len = self.len();
        if n > len {
            return Err(Error::InvalidArgument("consumed more bytes than the buffer holds"));
        }
        if n == 0 {
            return Ok(());
        }

        let remainder = self.as_slice()[n..].to_vec();
        self.storage = if remainder.is_empty() {
            None
        } else {
            Some(remainder.into_boxed_slice())
        };
        Ok(())
    }

    /// Take the storage out of this buffer, leaving it empty.
    pub fn take(&mut self) -> Option<Box<[u8]>> {
        self.storage.take()
    }

    /// Destroy this buffer, dropping its storage.
    pub fn destroy(self) -> Result<()> {
        self.destroy_with(release)
    }

    /// Destroy this buffer, handing its storage to `free`. The buffer itself is always released,
    /// a failing `free` is reported as [Error::Release].
    pub fn destroy_with<F>(mut self, mut free: F) -> Result<()>
    where
        F: FnMut(Box<[u8]>) -> Result<()>,
    {
        free_with(self.storage.take(), &mut free)
    }
}

/// Destroy the [Buffer] held in `slot` with the given freeing function, leaving the slot empty so
/// the handle can not be used again. An empty slot is an [Error::InvalidArgument].
pub fn destroy<F>(slot: &mut Option<Buffer>, free: F) -> Result<()>
where
    F: FnMut(Box<[u8]>) -> Result<()>,
{
    slot.take()
        .ok_or(Error::InvalidArgument("buffer handle is absent"))?
        .destroy_with(free)
}

impl From<Vec<u8>> for Buffer {
    fn from(value: Vec<u8>) -> Self {
        let storage = if value.is_empty() {
            None
        } else {
            Some(value.into_boxed_slice())
        };
        Buffer { storage }
    }
}

impl From<&[u8]> for Buffer {
    fn from(value: &[u8]) -> Self {
        Buffer::from(value.to_vec())
    }
}

impl AsRef<[u8]> for Buffer {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer").field("size", &self.len()).finish()
    }
}
