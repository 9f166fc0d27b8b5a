use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide sequence source; never reset, so two stamps taken in the
/// same second still differ.
static SEQUENCE: AtomicU64 = AtomicU64::new(1);

/// Correlation tag attached to every log line.
///
/// Renders as `YYYY-MM-DD HH:MM:SS [seq]`, a second-resolution UTC timestamp
/// plus a distinguishing suffix. The suffix makes stamps pseudo-unique within
/// a process without needing a clock finer than the human-readable prefix.
///
/// # Examples
///
/// ```rust
/// use taskd_core::stamp::Stamp;
///
/// let a = Stamp::next();
/// let b = Stamp::next();
/// assert_ne!(a.to_string(), b.to_string());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stamp {
    at: DateTime<Utc>,
    seq: u64,
}

impl Stamp {
    /// Take the next stamp: current UTC time plus a fresh sequence number
    pub fn next() -> Self {
        Self {
            at: Utc::now(),
            seq: SEQUENCE.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// The timestamp half of the tag
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.at
    }

    /// The distinguishing suffix
    pub fn sequence(&self) -> u64 {
        self.seq
    }
}

impl fmt::Display for Stamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.at.format("%Y-%m-%d %H:%M:%S"), self.seq)
    }
}
