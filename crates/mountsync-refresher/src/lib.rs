//! Mountsync Refresh Coordinator
//!
//! This crate implements the fan-out refresh cycle that keeps the mount-table
//! caches of a federated router fleet in sync. One cycle:
//!
//! 1. Asks the [`TargetResolver`](admin::TargetResolver) for the current fleet
//! 2. Builds one [`MountTableRefresher`](invoker::MountTableRefresher) per
//!    target with a non-empty admin address
//! 3. Dispatches all of them as independent tasks racing a single shared
//!    deadline
//! 4. Collects per-target outcomes into a concurrent
//!    [`FailureSet`](outcome::FailureSet)
//! 5. Evicts the admin client of every failed remote address from the
//!    [`ClientCache`](cache::ClientCache) so the next cycle builds a fresh one
//! 6. Emits exactly one summary line per cycle
//!
//! A background [`CacheCleaner`](cleaner::CacheCleaner) expires idle admin
//! clients independently of refresh cycles.
//!
//! # Components
//!
//! - [`admin`] - Consumed interfaces: admin client, factory, target resolver
//! - [`cache`] - Keyed cache of reusable per-address admin clients
//! - [`invoker`] - Single-target refresh invoker
//! - [`outcome`] - Per-target outcomes, cycle summary, failure accumulator
//! - [`cleaner`] - Periodic cache cleanup scheduler
//! - [`service`] - The coordinator tying everything together

pub mod admin;
pub mod cache;
pub mod cleaner;
pub mod invoker;
pub mod outcome;
pub mod service;

pub use admin::{AdminClientFactory, MountTableAdmin, StaticTargetResolver, TargetResolver};
pub use cache::{AdminClientCache, ClientCache};
pub use cleaner::CacheCleaner;
pub use invoker::MountTableRefresher;
pub use outcome::{CycleResult, CycleSummary, FailureSet, RefreshOutcome};
pub use service::{MountTableRefresherService, RefresherConfig};
