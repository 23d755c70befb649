//! Ordered provider lists and first-match resolution.
//!
//! Each abstract capability owns an append-only list of
//! `(predicate, factory)` candidates. Resolution walks the list in
//! registration order and the earliest matching candidate wins; that
//! ordering is the override mechanism, letting an embedding application
//! shadow any default purely by registering first. Factories run lazily, at
//! most once, and the outcome (including absence) is memoized so repeated
//! resolution hands back the same shared instance.

use crate::config::AppOptions;
use std::sync::Arc;

type Predicate = Box<dyn Fn(&AppOptions) -> bool + Send + Sync>;
type Factory<T> = Box<dyn FnOnce() -> Arc<T> + Send>;

struct Candidate<T: ?Sized> {
    predicate: Predicate,
    // Taken when the candidate is selected; a consumed slot can never run
    // again.
    factory: Option<Factory<T>>,
}

/// Candidate list for one capability.
///
/// Registration and resolution happen single-threaded during bootstrap;
/// afterwards only the resolved `Arc` leaves this struct, so no
/// synchronization lives here.
pub struct ProviderSet<T: ?Sized> {
    capability: &'static str,
    candidates: Vec<Candidate<T>>,
    resolved: Option<Option<Arc<T>>>,
}

impl<T: ?Sized> ProviderSet<T> {
    pub fn new(capability: &'static str) -> Self {
        Self {
            capability,
            candidates: Vec::new(),
            resolved: None,
        }
    }

    /// Capability identifier, used in diagnostics and startup errors.
    pub fn capability(&self) -> &'static str {
        self.capability
    }

    /// Append a candidate. Duplicates per capability are expected; nothing
    /// is ever removed or reordered.
    pub fn register<P, F>(&mut self, predicate: P, factory: F)
    where
        P: Fn(&AppOptions) -> bool + Send + Sync + 'static,
        F: FnOnce() -> Arc<T> + Send + 'static,
    {
        debug_assert!(
            self.resolved.is_none(),
            "registration for '{}' after resolution has no effect",
            self.capability
        );
        self.candidates.push(Candidate {
            predicate: Box::new(predicate),
            factory: Some(Box::new(factory)),
        });
    }

    /// Whether any candidate would match, without running a factory.
    ///
    /// The fallback composer uses this for its "only if still unresolved"
    /// checks.
    pub fn would_resolve(&self, options: &AppOptions) -> bool {
        if let Some(resolved) = &self.resolved {
            return resolved.is_some();
        }
        self.candidates
            .iter()
            .any(|candidate| (candidate.predicate)(options))
    }

    /// First matching candidate in registration order, or `None`.
    ///
    /// Absence is a legitimate terminal state; whether it is fatal is the
    /// caller's call, per capability.
    pub fn resolve(&mut self, options: &AppOptions) -> Option<Arc<T>> {
        if let Some(resolved) = &self.resolved {
            return resolved.clone();
        }
        let mut selected = None;
        for candidate in &mut self.candidates {
            if (candidate.predicate)(options) {
                selected = candidate.factory.take().map(|factory| factory());
                break;
            }
        }
        self.resolved = Some(selected.clone());
        selected
    }

    #[cfg(test)]
    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    trait Named: Send + Sync {
        fn name(&self) -> &'static str;
    }

    struct Fixed(&'static str);

    impl Named for Fixed {
        fn name(&self) -> &'static str {
            self.0
        }
    }

    fn options() -> AppOptions {
        AppOptions::default()
    }

    #[test]
    fn earliest_matching_candidate_wins() {
        let mut set: ProviderSet<dyn Named> = ProviderSet::new("storage-service");
        set.register(|_| false, || Arc::new(Fixed("never")));
        set.register(|_| true, || Arc::new(Fixed("first")));
        set.register(|_| true, || Arc::new(Fixed("shadowed")));

        let resolved = set.resolve(&options()).unwrap();
        assert_eq!(resolved.name(), "first");
    }

    #[test]
    fn no_matching_candidate_yields_absent_not_error() {
        let mut set: ProviderSet<dyn Named> = ProviderSet::new("search-service");
        set.register(|_| false, || Arc::new(Fixed("never")));
        assert!(!set.would_resolve(&options()));
        assert!(set.resolve(&options()).is_none());
        // Absence is memoized too.
        assert!(set.resolve(&options()).is_none());
    }

    #[test]
    fn selected_factory_runs_exactly_once() {
        static BUILT: AtomicUsize = AtomicUsize::new(0);
        static SKIPPED: AtomicUsize = AtomicUsize::new(0);

        let mut set: ProviderSet<dyn Named> = ProviderSet::new("storage-service");
        set.register(
            |_| true,
            || {
                BUILT.fetch_add(1, Ordering::SeqCst);
                Arc::new(Fixed("selected"))
            },
        );
        set.register(
            |_| true,
            || {
                SKIPPED.fetch_add(1, Ordering::SeqCst);
                Arc::new(Fixed("skipped"))
            },
        );

        let first = set.resolve(&options()).unwrap();
        let second = set.resolve(&options()).unwrap();
        assert!(Arc::ptr_eq(&first, &second), "resolution must be idempotent");
        assert_eq!(BUILT.load(Ordering::SeqCst), 1);
        assert_eq!(SKIPPED.load(Ordering::SeqCst), 0, "unselected factories never run");
    }

    #[test]
    fn would_resolve_runs_no_factories() {
        static BUILT: AtomicUsize = AtomicUsize::new(0);
        let mut set: ProviderSet<dyn Named> = ProviderSet::new("search-service");
        set.register(
            |_| true,
            || {
                BUILT.fetch_add(1, Ordering::SeqCst);
                Arc::new(Fixed("lazy"))
            },
        );
        assert!(set.would_resolve(&options()));
        assert_eq!(BUILT.load(Ordering::SeqCst), 0);
        set.resolve(&options());
        assert_eq!(BUILT.load(Ordering::SeqCst), 1);
    }
}
