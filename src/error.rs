use thiserror::Error;

/// Contract violations reported by [`crate::RingBuffer`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RingError {
    #[error("invalid capacity {size}: a ring buffer needs at least one slot")]
    InvalidCapacity { size: usize },

    #[error("invalid capacity {size}: cannot allocate that many slots")]
    CapacityTooLarge { size: usize },

    #[error("cannot {op} an empty ring buffer")]
    EmptyBufferUnderflow { op: &'static str },
}

impl RingError {
    pub fn is_underflow(&self) -> bool {
        matches!(self, RingError::EmptyBufferUnderflow { .. })
    }
}
