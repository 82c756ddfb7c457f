use dashmap::DashSet;

/// Terminal result of one refresh invoker within one cycle.
///
/// Produced exactly once per invoker per cycle. `Timeout` is fixed once the
/// shared deadline elapses, even if the underlying call later succeeds in
/// the background.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The node reloaded its mount table cache
    Success,
    /// The node returned a recognized negative result
    Failure,
    /// The shared cycle deadline elapsed before the call returned
    Timeout,
    /// The call raised a fault (transport error, task failure, ...)
    Fault(String),
}

impl RefreshOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RefreshOutcome::Success)
    }
}

/// How a whole cycle's aggregate wait ended.
///
/// The three cases stay distinguishable in the emitted log: normal
/// completion logs only the summary line, a timeout adds one diagnostic
/// line, an interruption adds a different one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleResult {
    /// Every dispatched task reached a terminal state before the deadline
    Completed,
    /// At least one task ran past the shared deadline
    TimedOut,
    /// The aggregate wait was interrupted externally before completion
    Interrupted,
}

/// Totals for one `refresh()` invocation.
///
/// Invariant: `success_count + failure_count` equals the number of
/// dispatched invokers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleSummary {
    pub success_count: usize,
    pub failure_count: usize,
    pub result: CycleResult,
}

impl CycleSummary {
    /// Summary of a cycle that dispatched nothing.
    pub fn empty() -> Self {
        Self {
            success_count: 0,
            failure_count: 0,
            result: CycleResult::Completed,
        }
    }

    pub fn all_succeeded(&self) -> bool {
        self.failure_count == 0
    }
}

/// Concurrent set of addresses considered failed for the current cycle.
///
/// Mutated by completion callbacks running on arbitrary worker tasks. The
/// coordinator's final read happens-after every callback because it only
/// reads after joining (or abandoning) all tasks; `DashSet` provides the
/// per-operation synchronization in between.
///
/// Two equivalent formulations exist: start empty and insert on every
/// non-success, or pre-populate with every dispatched address and remove on
/// success. The coordinator uses the second so that an interrupted cycle
/// naturally leaves every unconfirmed address in the set.
#[derive(Debug, Default)]
pub struct FailureSet {
    inner: DashSet<String>,
}

impl FailureSet {
    /// Creates an empty set, for the insert-on-failure formulation.
    pub fn new() -> Self {
        Self {
            inner: DashSet::new(),
        }
    }

    /// Creates a set pre-populated with every dispatched address.
    pub fn assume_failed<I, S>(addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let inner = DashSet::new();
        for address in addresses {
            inner.insert(address.into());
        }
        Self { inner }
    }

    /// Records a non-success outcome for the address.
    ///
    /// Returns `true` if the address was not already present.
    pub fn record_failure(&self, address: &str) -> bool {
        self.inner.insert(address.to_string())
    }

    /// Removes the address after a confirmed success.
    ///
    /// Returns `true` if the address was present.
    pub fn confirm_success(&self, address: &str) -> bool {
        self.inner.remove(address).is_some()
    }

    pub fn contains(&self, address: &str) -> bool {
        self.inner.contains(address)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Snapshot of the current contents.
    pub fn addresses(&self) -> Vec<String> {
        self.inner.iter().map(|entry| entry.key().clone()).collect()
    }
}
