//! Block height and the clock that supplies it.
//!
//! Heights are monotonic and externally supplied; the voting core reads the
//! clock at most once per operation and never advances it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A monotonic height as reported by the host chain.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Height(u64);

impl Height {
    /// Height zero.
    pub const GENESIS: Self = Self(0);

    pub fn new(height: u64) -> Self {
        Self(height)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Height reached after `blocks` more blocks, saturating at `u64::MAX`.
    pub fn saturating_add(&self, blocks: u64) -> Self {
        Self(self.0.saturating_add(blocks))
    }

    /// Blocks remaining until `end` (zero once it has been reached).
    pub fn blocks_until(&self, end: Height) -> u64 {
        end.0.saturating_sub(self.0)
    }
}

impl fmt::Display for Height {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Source of the current height.
pub trait Clock {
    fn height(&self) -> Height;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn height(&self) -> Height {
        (**self).height()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn height(&self) -> Height {
        (**self).height()
    }
}
