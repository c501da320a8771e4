//! Clock port, so subscription windows can be computed at a chosen instant.

use crate::domain::foundation::Timestamp;

pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}
