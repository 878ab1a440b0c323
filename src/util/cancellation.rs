use std::sync::atomic::{AtomicBool, Ordering};

pub trait CancellationToken {
    fn is_cancellation_requested(&self) -> bool;
}

#[derive(Debug, Default)]
pub struct AtomicCancellationToken {
    cancelled: AtomicBool,
}

impl AtomicCancellationToken {
    pub fn new() -> Self {
        Self {
            cancelled: AtomicBool::new(false),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}

impl CancellationToken for AtomicCancellationToken {
    fn is_cancellation_requested(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Cancellation tied to a game generation: the token reports cancelled once
/// the shared counter moves past the generation it was issued for.
pub struct GenerationToken<'a> {
    issued_for: u64,
    current: &'a std::sync::atomic::AtomicU64,
}

impl<'a> GenerationToken<'a> {
    pub fn new(issued_for: u64, current: &'a std::sync::atomic::AtomicU64) -> Self {
        Self {
            issued_for,
            current,
        }
    }

    pub fn issued_for(&self) -> u64 {
        self.issued_for
    }
}

impl CancellationToken for GenerationToken<'_> {
    fn is_cancellation_requested(&self) -> bool {
        self.current.load(Ordering::SeqCst) != self.issued_for
    }
}

/// Cancelled when either token is.
pub struct EitherToken<'a, A, B> {
    first: &'a A,
    second: &'a B,
}

impl<'a, A, B> EitherToken<'a, A, B> {
    pub fn new(first: &'a A, second: &'a B) -> Self {
        Self { first, second }
    }
}

impl<A, B> CancellationToken for EitherToken<'_, A, B>
where
    A: CancellationToken,
    B: CancellationToken,
{
    fn is_cancellation_requested(&self) -> bool {
        self.first.is_cancellation_requested() || self.second.is_cancellation_requested()
    }
}
