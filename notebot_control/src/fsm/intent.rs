//! Per-tick reset fields.

/// A value that falls back to its default after every tick.
///
/// Callers must re-assert a request on every tick they want it honoured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetField<T: Copy> {
    value: T,
    default: T,
}

impl<T: Copy> ResetField<T> {
    pub const fn new(default: T) -> Self {
        Self {
            value: default,
            default,
        }
    }

    #[inline]
    pub fn set(&mut self, value: T) {
        self.value = value;
    }

    #[inline]
    pub fn get(&self) -> T {
        self.value
    }

    #[inline]
    pub fn update(&mut self, f: impl FnOnce(T) -> T) {
        self.value = f(self.value);
    }

    #[inline]
    pub fn reset(&mut self) {
        self.value = self.default;
    }
}
