//! The [FlagSet] is a compact bit set used to configure the operations in this crate, it maps the
//! small dense option ids described by [Flag] onto individual bits. Construction and clearing take
//! an explicit slice of ids, there is no sentinel terminated list to scan.
//!
//! ```
//! use libsio::flags::{Flag, FlagSet};
//!
//! let flags = FlagSet::new(&[Flag::AutoRetry, Flag::UpdateInput]);
//! assert!(flags.contains(Flag::AutoRetry));
//!
//! let flags = flags.without(Flag::UpdateInput);
//! assert!(!flags.contains(Flag::UpdateInput));
//! assert!(flags.contains(Flag::AutoRetry));
//! ```

use std::fmt;

use crate::{
    bits,
    error::{Error, Result},
};

const FLAG_BYTES: usize = 4;

/// The number of option ids a [FlagSet] can represent, valid ids are `0..MAX_FLAGS`.
pub const MAX_FLAGS: u32 = (FLAG_BYTES * 8) as u32;

/// The recognized option ids. The discriminant of each variant is its stable id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Flag {
    /// Text utilities built on top of this crate destroy their input buffer before returning.
    FreeInput = 0,
    /// Mutate the input buffer in place to its unconsumed remainder, see
    /// [crate::buffer::Buffer::consume].
    UpdateInput = 1,
    ScopyPermit = 2,
    ScopyDelimit = 3,
    SseekPermit = 4,
    SseekDelimit = 5,
    /// Retry interrupted waits, would-block conditions and short transfers internally instead of
    /// surfacing them as [crate::error::Status::Retryable].
    AutoRetry = 6,
    /// Retry would-block conditions internally even when [Flag::AutoRetry] is unset.
    RetryWouldBlock = 7,
}

impl Flag {
    pub fn id(self) -> u32 {
        self as u32
    }
}

/// A fixed width set of option ids, all unset by default.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FlagSet {
    bits: [u8; FLAG_BYTES],
}

impl FlagSet {
    /// Create a [FlagSet] with exactly the given typed flags set.
    pub fn new(flags: &[Flag]) -> FlagSet {
        flags.iter().fold(FlagSet::default(), |set, flag| set.with(*flag))
    }

    /// Create a [FlagSet] with exactly the given raw ids set, an empty slice yields an empty set.
    /// Fails with [Error::InvalidArgument] if any id is outside of `0..MAX_FLAGS`.
    pub fn make(ids: &[u32]) -> Result<FlagSet> {
        let mut set = FlagSet::default();
        for id in ids {
            bits::set(&mut set.bits, Self::position(*id)?)?;
        }
        Ok(set)
    }

    /// Whether `id` is set, ids outside of the representable range are never set.
    pub fn is_set(&self, id: u32) -> bool {
        Self::position(id)
            .ok()
            .and_then(|pos| bits::get(&self.bits, pos))
            .unwrap_or(false)
    }

    pub fn contains(&self, flag: Flag) -> bool {
        self.is_set(flag.id())
    }

    /// Return a copy of this set with exactly the given raw ids cleared. Fails with
    /// [Error::InvalidArgument] if any id is outside of `0..MAX_FLAGS`, in which case nothing is
    /// cleared.
    pub fn clear(&self, ids: &[u32]) -> Result<FlagSet> {
        let mut set = *self;
        for id in ids {
            bits::clear(&mut set.bits, Self::position(*id)?)?;
        }
        Ok(set)
    }

    pub fn with(mut self, flag: Flag) -> FlagSet {
        let res = bits::set(&mut self.bits, flag.id() as usize);
        debug_assert!(res.is_ok(), "{:?} is out of range", flag);
        self
    }

    pub fn without(mut self, flag: Flag) -> FlagSet {
        let res = bits::clear(&mut self.bits, flag.id() as usize);
        debug_assert!(res.is_ok(), "{:?} is out of range", flag);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|b| *b == 0)
    }

    /// Iterate over the raw ids that are set, in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        (0..MAX_FLAGS).filter(move |id| self.is_set(*id))
    }

    fn position(id: u32) -> Result<usize> {
        if id >= MAX_FLAGS {
            return Err(Error::InvalidArgument("flag id out of range"));
        }
        Ok(id as usize)
    }
}

impl From<Flag> for FlagSet {
    fn from(flag: Flag) -> Self {
        FlagSet::default().with(flag)
    }
}

impl fmt::Debug for FlagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.ids()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unset() {
        let flags = FlagSet::default();
        assert!(flags.is_empty());
        assert!((0..MAX_FLAGS).all(|id| !flags.is_set(id)));
        assert_eq!(FlagSet::make(&[]).unwrap(), flags);
    }

    #[test]
    fn test_make_sets_exactly_given_ids() {
        let flags = FlagSet::make(&[0, 6, 31]).unwrap();
        assert_eq!(flags.ids().collect::<Vec<_>>(), vec![0, 6, 31]);
        assert!(flags.contains(Flag::FreeInput));
        assert!(flags.contains(Flag::AutoRetry));
        assert!(!flags.contains(Flag::UpdateInput));
    }

    #[test]
    fn test_clear_other_id_keeps_set_id() {
        let flags = FlagSet::make(&[Flag::AutoRetry.id()]).unwrap();
        let flags = flags.clear(&[Flag::UpdateInput.id()]).unwrap();
        assert!(flags.contains(Flag::AutoRetry));

        let flags = flags.clear(&[Flag::AutoRetry.id()]).unwrap();
        assert!(flags.is_empty());
    }

    #[test]
    fn test_out_of_range_ids() {
        assert!(matches!(
            FlagSet::make(&[1, MAX_FLAGS]),
            Err(Error::InvalidArgument(_))
        ));

        let flags = FlagSet::new(&[Flag::FreeInput]);
        assert!(!flags.is_set(MAX_FLAGS));
        assert!(!flags.is_set(u32::MAX));
        assert!(matches!(
            flags.clear(&[0, 40]),
            Err(Error::InvalidArgument(_))
        ));
        // The receiver is a value, a failed clear leaves it untouched.
        assert!(flags.contains(Flag::FreeInput));
    }

    #[test]
    fn test_every_flag_is_representable() {
        let all = [
            Flag::FreeInput,
            Flag::UpdateInput,
            Flag::ScopyPermit,
            Flag::ScopyDelimit,
            Flag::SseekPermit,
            Flag::SseekDelimit,
            Flag::AutoRetry,
            Flag::RetryWouldBlock,
        ];
        for flag in all {
            let set = FlagSet::from(flag);
            assert_eq!(set.ids().collect::<Vec<_>>(), vec![flag.id()]);
            assert!(set.without(flag).is_empty());
        }
        assert_eq!(FlagSet::new(&all).ids().count(), all.len());
    }

    #[test]
    fn test_typed_builders() {
        let flags = FlagSet::from(Flag::RetryWouldBlock).with(Flag::AutoRetry);
        assert_eq!(format!("{:?}", flags), "{6, 7}");
        assert_eq!(
            flags.without(Flag::RetryWouldBlock),
            FlagSet::from(Flag::AutoRetry)
        );
    }
}
