//! Prime Group Module
//!
//! Counted barrier used by bulk priming to signal completion exactly once.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tracing::warn;

use crate::storage::lock;

type Callback = Box<dyn FnOnce() + Send>;

// == Prime Group ==
/// Wait group that runs a callback when its count first reaches zero.
///
/// The count starts at 1, standing for the dispatcher itself: the
/// dispatcher calls [`add`](Self::add) before handing out each unit of work
/// and one final [`done`](Self::done) when it has dispatched everything, so
/// work that completes during dispatch cannot fire the callback early.
pub struct PrimeGroup {
    pending: AtomicUsize,
    on_complete: Mutex<Option<Callback>>,
}

impl PrimeGroup {
    // == Constructor ==
    pub fn new<F>(on_complete: F) -> Arc<Self>
    where
        F: FnOnce() + Send + 'static,
    {
        Arc::new(Self {
            pending: AtomicUsize::new(1),
            on_complete: Mutex::new(Some(Box::new(on_complete))),
        })
    }

    /// Registers one more unit of outstanding work.
    pub fn add(&self) {
        self.pending.fetch_add(1, Ordering::AcqRel);
    }

    /// Marks one unit of work finished.
    ///
    /// The call that takes the count to zero runs the callback. Extra calls
    /// past zero are ignored.
    pub fn done(&self) {
        let previous = self
            .pending
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
        match previous {
            Ok(1) => {
                let callback = lock(&self.on_complete).take();
                if let Some(callback) = callback {
                    callback();
                }
            }
            Ok(_) => {}
            Err(_) => warn!("Prime group completed more work than was dispatched"),
        }
    }

    /// Outstanding units of work, including the dispatcher's own.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    pub fn is_complete(&self) -> bool {
        self.pending() == 0
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn counting_group() -> (Arc<PrimeGroup>, Arc<AtomicUsize>) {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        let group = PrimeGroup::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (group, fired)
    }

    #[test]
    fn test_group_starts_at_one() {
        let (group, fired) = counting_group();

        assert_eq!(group.pending(), 1);
        assert!(!group.is_complete());
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_dispatcher_done_alone_fires() {
        let (group, fired) = counting_group();

        group.done();

        assert!(group.is_complete());
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_work_finishing_during_dispatch_does_not_fire_early() {
        let (group, fired) = counting_group();

        group.add();
        group.done();
        group.add();
        group.done();
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        group.done();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_fires_exactly_once() {
        let (group, fired) = counting_group();

        group.done();
        group.done();
        group.done();

        assert_eq!(group.pending(), 0);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_done_from_many_threads() {
        let (group, fired) = counting_group();
        for _ in 0..8 {
            group.add();
        }

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let group = group.clone();
                std::thread::spawn(move || group.done())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        group.done();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }
}
