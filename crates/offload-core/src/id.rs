//! Job slot identifier type

use core::fmt;

/// Identifier of a job slot inside a worker's pool
///
/// This is a 32-bit value that indexes into the slot array.
/// The maximum value (u32::MAX) is reserved as a sentinel for "no job".
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct JobId(u32);

impl JobId {
    /// Sentinel value indicating no job
    pub const NONE: JobId = JobId(u32::MAX);

    /// Create a new JobId from a raw value
    #[inline]
    pub const fn new(id: u32) -> Self {
        JobId(id)
    }

    /// Get the raw u32 value
    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Get as usize for indexing
    #[inline]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }

    /// Check if this is the NONE sentinel
    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }

    /// Check if this is a valid job ID
    #[inline]
    pub const fn is_some(self) -> bool {
        self.0 != u32::MAX
    }
}

impl From<u32> for JobId {
    #[inline]
    fn from(id: u32) -> Self {
        JobId(id)
    }
}

impl From<JobId> for u32 {
    #[inline]
    fn from(id: JobId) -> Self {
        id.0
    }
}

impl fmt::Debug for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            write!(f, "JobId(NONE)")
        } else {
            write!(f, "JobId({})", self.0)
        }
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            write!(f, "none")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_roundtrip() {
        let id = JobId::new(7);
        assert_eq!(id.as_u32(), 7);
        assert_eq!(id.as_usize(), 7);
        assert!(id.is_some());
        assert_eq!(u32::from(id), 7);
        assert_eq!(JobId::from(7u32), id);
    }

    #[test]
    fn test_none_sentinel() {
        assert!(JobId::NONE.is_none());
        assert!(!JobId::NONE.is_some());
        assert_eq!(format!("{}", JobId::NONE), "none");
        assert_eq!(format!("{:?}", JobId::new(3)), "JobId(3)");
    }
}
