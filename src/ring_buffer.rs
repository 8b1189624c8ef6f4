use crate::error::RingError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Element type stored in a [`RingBuffer`].
pub type Value = i64;

/// What a pop does to the slot it vacates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotPolicy {
    /// Leave the stale value in place.
    Retain,
    /// Overwrite the slot with the buffer's default value.
    Reset,
}

pub const DEFAULT_SLOT_POLICY: SlotPolicy = SlotPolicy::Retain;

impl Default for SlotPolicy {
    fn default() -> Self {
        DEFAULT_SLOT_POLICY
    }
}

impl SlotPolicy {
    pub fn label(self) -> &'static str {
        match self {
            SlotPolicy::Retain => "retain",
            SlotPolicy::Reset  => "reset",
        }
    }
}

/// Fixed-capacity ring buffer. Push and pop both work at `front`, so it
/// behaves as a bounded stack whose oldest entry is overwritten when full.
#[derive(Debug, Clone)]
pub struct RingBuffer {
    data: Vec<Value>,
    default_value: Value,
    /// Most recently pushed slot.
    front: usize,
    /// Oldest slot still logically present.
    back: usize,
    len: usize,
    policy: SlotPolicy,
}

impl RingBuffer {
    pub fn new(default_value: Value, size: usize) -> Result<Self, RingError> {
        Self::with_policy(default_value, size, DEFAULT_SLOT_POLICY)
    }

    pub fn with_policy(default_value: Value, size: usize, policy: SlotPolicy) -> Result<Self, RingError> {
        if size == 0 {
            return Err(RingError::InvalidCapacity { size });
        }
        let mut data = Vec::new();
        data.try_reserve_exact(size)
            .map_err(|_| RingError::CapacityTooLarge { size })?;
        data.resize(size, default_value);
        log::debug!(
            "ring buffer created (capacity {}, default {}, slot policy {})",
            size, default_value, policy.label()
        );
        Ok(Self {
            data,
            default_value,
            front: 0,
            back: 0,
            len: 0,
            policy,
        })
    }

    pub fn capacity(&self) -> usize { self.data.len() }
    pub fn len(&self) -> usize { self.len }
    pub fn policy(&self) -> SlotPolicy { self.policy }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True when the next push will overwrite the oldest element.
    pub fn is_full(&self) -> bool {
        let full = !self.is_empty() && self.next(self.front) == self.back;
        debug_assert_eq!(full, self.len == self.capacity());
        full
    }

    /// Drop every element in O(1). Storage is left as is.
    pub fn clear(&mut self) {
        self.front = 0;
        self.back = 0;
        self.len = 0;
    }

    /// Like [`clear`](Self::clear), but also refills storage with the default
    /// value so the buffer is indistinguishable from a new one.
    pub fn reset(&mut self) {
        self.data.fill(self.default_value);
        self.clear();
    }

    /// Push `value` and return whatever occupied the slot it landed in.
    ///
    /// On a full buffer that is the evicted oldest element. Otherwise it is
    /// the default value, or a stale value left behind by an earlier pop or
    /// clear.
    pub fn push(&mut self, value: Value) -> Value {
        let was_empty = self.is_empty();
        let was_full  = self.is_full();

        let idx = if was_empty { self.front } else { self.next(self.front) };
        let old = std::mem::replace(&mut self.data[idx], value);
        self.front = idx;

        if was_empty {
            self.back = idx;
        } else if was_full {
            self.back = self.next(self.back);
            log::trace!("ring buffer full, evicted {} for {}", old, value);
        }
        if !was_full {
            self.len += 1;
        }
        old
    }

    /// Remove and return the most recently pushed value.
    pub fn pop(&mut self) -> Result<Value, RingError> {
        if self.is_empty() {
            log::trace!("pop on empty ring buffer");
            return Err(RingError::EmptyBufferUnderflow { op: "pop" });
        }
        let idx = self.front;
        let value = self.data[idx];
        if self.policy == SlotPolicy::Reset {
            self.data[idx] = self.default_value;
        }
        // With a single element front == back; both stay put.
        if self.len > 1 {
            self.front = self.prev(idx);
        }
        self.len -= 1;
        Ok(value)
    }

    pub fn peek(&self) -> Result<Value, RingError> {
        if self.is_empty() {
            log::trace!("peek on empty ring buffer");
            return Err(RingError::EmptyBufferUnderflow { op: "peek" });
        }
        Ok(self.data[self.front])
    }

    /// Iterate most-recent first, the order successive pops would return.
    pub fn iter(&self) -> impl Iterator<Item = Value> + '_ {
        let cap = self.capacity();
        (0..self.len).map(move |i| self.data[(self.front + cap - i) % cap])
    }

    /// Returns up to `n` most-recent values, oldest first.
    pub fn last_n(&self, n: usize) -> Vec<Value> {
        let n = n.min(self.len);
        let cap = self.capacity();
        let mut out = Vec::with_capacity(n);
        for i in (0..n).rev() {
            out.push(self.data[(self.front + cap - i) % cap]);
        }
        out
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            capacity:      self.capacity(),
            len:           self.len,
            front:         self.front,
            back:          self.back,
            is_empty:      self.is_empty(),
            is_full:       self.is_full(),
            default_value: self.default_value,
            policy:        self.policy,
            contents:      self.iter().collect(),
        }
    }

    fn next(&self, idx: usize) -> usize {
        (idx + 1) % self.capacity()
    }

    fn prev(&self, idx: usize) -> usize {
        (idx + self.capacity() - 1) % self.capacity()
    }
}

impl fmt::Display for RingBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, v) in self.iter().enumerate() {
            if i > 0 { write!(f, ", ")?; }
            write!(f, "{}", v)?;
        }
        write!(f, "]")
    }
}

/// Point-in-time view of a buffer, used for reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub capacity:      usize,
    pub len:           usize,
    pub front:         usize,
    pub back:          usize,
    pub is_empty:      bool,
    pub is_full:       bool,
    pub default_value: Value,
    pub policy:        SlotPolicy,
    /// Most-recent first.
    pub contents:      Vec<Value>,
}
