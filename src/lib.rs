//! Fixed-capacity integer ring buffer.
//!
//! [`RingBuffer`] pushes and pops at the same end (`front`) and overwrites
//! its oldest element when a push lands on a full buffer, so it acts as a
//! bounded LIFO history. Underflow is reported as [`RingError`] instead of
//! a sentinel value.
//!
//! ```
//! use rbuf::RingBuffer;
//!
//! let mut buf = RingBuffer::new(0, 3)?;
//! for v in [1, 2, 3] {
//!     buf.push(v);
//! }
//! assert!(buf.is_full());
//! assert_eq!(buf.push(4), 1); // evicts the oldest
//! assert_eq!(buf.pop()?, 4);
//! # Ok::<(), rbuf::RingError>(())
//! ```

pub mod config;
pub mod error;
pub mod report;
pub mod ring_buffer;
pub mod script;

pub use error::RingError;
pub use ring_buffer::{RingBuffer, SlotPolicy, Snapshot, Value, DEFAULT_SLOT_POLICY};
