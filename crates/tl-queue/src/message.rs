//! `Message` — flush policy applied by [`MessageQueue::send`].
//!
//! [`MessageQueue::send`]: crate::MessageQueue::send

use tl_core::Phase;

// ── Trait ─────────────────────────────────────────────────────────────────────

/// A value that can travel through a [`MessageQueue`][crate::MessageQueue].
///
/// # Contract
///
/// - Must be cheap and side-effect free; it is evaluated under the queue lock.
pub trait Message {
    /// `true` if enqueuing this value must first discard every value still
    /// waiting in the queue.
    ///
    /// Default: `false` (plain FIFO hand-off).
    fn flushes_backlog(&self) -> bool {
        false
    }
}

/// Red invalidates any green still waiting to be consumed.
impl Message for Phase {
    #[inline]
    fn flushes_backlog(&self) -> bool {
        self.is_red()
    }
}

// ── Plain data ────────────────────────────────────────────────────────────────

macro_rules! never_flushes {
    ($($t:ty),* $(,)?) => {
        $(impl Message for $t {})*
    };
}

never_flushes!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize, bool, char, String, &'static str);
