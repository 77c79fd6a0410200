//! The memory model that feeds the socket transfers in [crate::net]. This exposes two types:
//! - [Buffer] a single contiguous owned byte region.
//! - [Bag] an ordered chain of independently allocated [Pocket]s, which can be appended to,
//!   deleted from at any position, and flattened into a single [Buffer].
//!
//! Storage is always released through a freeing function, which defaults to [release] and simply
//! drops the memory. Callers that track their allocations can pass their own, a failing freeing
//! function is reported as [crate::error::Error::Release] once the container has been released.

mod bag;
mod data;

use crate::error::{Error, Result};

pub use bag::{Bag, Iter, Pocket, PocketId};
pub use data::{destroy, Buffer};

/// The default freeing function, drops the storage.
pub fn release(storage: Box<[u8]>) -> Result<()> {
    drop(storage);
    Ok(())
}

/// Allocate `size` zeroed bytes, reporting allocation failure instead of aborting. Returns [None]
/// for a zero sized request since an empty region owns no storage.
pub(crate) fn allocate(size: usize) -> Result<Option<Box<[u8]>>> {
    if size == 0 {
        return Ok(None);
    }

    let mut storage = Vec::new();
    storage.try_reserve_exact(size)?;
    storage.resize(size, 0u8);
    Ok(Some(storage.into_boxed_slice()))
}

pub(crate) fn free_with<F>(storage: Option<Box<[u8]>>, free: &mut F) -> Result<()>
where
    F: FnMut(Box<[u8]>) -> Result<()>,
{
    match storage {
        Some(storage) => free(storage).map_err(|_| Error::Release),
        None => Ok(()),
    }
}
