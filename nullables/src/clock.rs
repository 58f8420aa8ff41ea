//! Nullable clock: a block height that tests move by hand.

use agora_types::{Clock, Height};
use std::cell::Cell;

#[derive(Debug, Default)]
pub struct NullClock {
    height: Cell<Height>,
}

impl NullClock {
    pub fn new(height: u64) -> Self {
        Self {
            height: Cell::new(Height::new(height)),
        }
    }

    pub fn now(&self) -> Height {
        self.height.get()
    }

    /// Move forward by `blocks`.
    pub fn advance(&self, blocks: u64) {
        self.height.set(self.now().saturating_add(blocks));
    }

    /// Jump to `height`, backwards included.
    pub fn set(&self, height: u64) {
        self.height.set(Height::new(height));
    }
}

impl Clock for NullClock {
    fn height(&self) -> Height {
        self.now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_only_on_request() {
        let clock = NullClock::new(10);
        assert_eq!(clock.height(), Height::new(10));
        clock.advance(5);
        assert_eq!(clock.height(), Height::new(15));
        clock.set(3);
        assert_eq!((&clock).height(), Height::new(3));
    }

    #[test]
    fn default_starts_at_genesis() {
        assert_eq!(NullClock::default().now(), Height::GENESIS);
    }
}
