#![forbid(unsafe_code)]

//! Interrupt policy for in-flight animations.
//!
//! Every animation carries an [`InterruptTrigger`] set chosen when it
//! starts. An input class missing from that set is inert until the
//! animation ends: drag and scroll begins stay idle, and programmatic moves
//! complete with `finished = false` without touching any state.

use bitflags::bitflags;

bitflags! {
    /// Input classes allowed to cancel the running animation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct InterruptTrigger: u8 {
        /// Direct drag on the sheet.
        const PAN_GESTURE     = 0b001;
        /// Drag on linked scroll content.
        const SCROLL_DRAGGING = 0b010;
        /// Programmatic `move_to` / `scroll_to` calls.
        const PROGRAM         = 0b100;
    }
}

impl Default for InterruptTrigger {
    fn default() -> Self {
        Self::all()
    }
}

impl InterruptTrigger {
    /// Whether an input of class `trigger` may cancel an animation carrying
    /// this policy.
    #[inline]
    #[must_use]
    pub fn permits(self, trigger: InterruptTrigger) -> bool {
        self.contains(trigger)
    }
}
