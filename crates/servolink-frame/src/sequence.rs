/// Running sequence counter stamped on outbound frames.
///
/// Zero is the wire value for "sequencing disabled". Setting the counter to
/// zero turns auto-increment off; any other value turns it on. An enabled
/// counter wraps 255 → 0 → 1 and keeps counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sequence {
    value: u8,
    enabled: bool,
}

impl Sequence {
    /// Sequencing off: every frame carries 0.
    pub const fn disabled() -> Self {
        Self {
            value: 0,
            enabled: false,
        }
    }

    /// Counter starting at `value`; 0 means disabled.
    pub const fn new(value: u8) -> Self {
        Self {
            value,
            enabled: value != 0,
        }
    }

    /// Value to stamp on the next frame.
    pub fn current(&self) -> u8 {
        self.value
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Replace the counter; 0 disables it.
    pub fn set(&mut self, value: u8) {
        *self = Self::new(value);
    }

    /// Step past a successfully sent frame.
    pub fn advance(&mut self) {
        if self.enabled {
            self.value = self.value.wrapping_add(1);
        }
    }
}

impl Default for Sequence {
    fn default() -> Self {
        Self::disabled()
    }
}
