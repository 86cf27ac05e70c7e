//! Shared scan state: per-protocol result lists and running counters
//!
//! All mutation happens under one mutex. Counters are atomics so the progress
//! reporter can read them without contending with the probes; those reads may
//! be slightly stale, which is fine for a status line.

use crate::proxy::models::{Proxy, ProxyType};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError, TryLockError};

#[derive(Default)]
struct Inner {
    lists: [Vec<Proxy>; 4],
    seen: [HashSet<Proxy>; 4],
    last: Option<Proxy>,
}

#[derive(Default)]
struct Counters {
    done: AtomicU64,
    found: AtomicU64,
    failed: AtomicU64,
    ok: [AtomicU64; 4],
}

/// Results and statistics shared by every in-flight check
pub struct ResultStore {
    total: u64,
    inner: Mutex<Inner>,
    counters: Counters,
}

impl ResultStore {
    /// Create an empty store for a scan over `total` endpoints
    pub fn new(total: usize) -> Self {
        Self {
            total: total as u64,
            inner: Mutex::new(Inner::default()),
            counters: Counters::default(),
        }
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    // The store only ever grows, so state behind a poisoned lock is still valid.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append `proxy` to the list for `protocol`.
    ///
    /// Returns `false` and changes nothing when the endpoint is already listed.
    pub fn record_success(&self, proxy: &Proxy, protocol: ProxyType) -> bool {
        let idx = protocol.index();
        let mut inner = self.lock();
        if !inner.seen[idx].insert(proxy.clone()) {
            return false;
        }
        inner.lists[idx].push(proxy.clone());
        self.counters.ok[idx].fetch_add(1, Ordering::Relaxed);
        true
    }

    /// Mark one endpoint as fully checked
    pub fn record_done(&self, proxy: &Proxy, found_any: bool) {
        let mut inner = self.lock();
        self.counters.done.fetch_add(1, Ordering::Relaxed);
        if found_any {
            self.counters.found.fetch_add(1, Ordering::Relaxed);
        } else {
            self.counters.failed.fetch_add(1, Ordering::Relaxed);
        }
        inner.last = Some(proxy.clone());
    }

    /// Consistent copy of every result list
    pub fn snapshot(&self) -> ResultSnapshot {
        let inner = self.lock();
        ResultSnapshot {
            lists: inner.lists.clone(),
        }
    }

    /// Counter values without taking the store lock.
    ///
    /// `last` is `None` when the lock is momentarily held by a writer.
    pub fn stats(&self) -> StatsSnapshot {
        let last = match self.inner.try_lock() {
            Ok(inner) => inner.last.clone(),
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner().last.clone(),
            Err(TryLockError::WouldBlock) => None,
        };

        StatsSnapshot {
            total: self.total,
            done: self.counters.done.load(Ordering::Relaxed),
            found: self.counters.found.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            ok: [
                self.counters.ok[0].load(Ordering::Relaxed),
                self.counters.ok[1].load(Ordering::Relaxed),
                self.counters.ok[2].load(Ordering::Relaxed),
                self.counters.ok[3].load(Ordering::Relaxed),
            ],
            last,
        }
    }
}

/// Frozen copy of the per-protocol result lists
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSnapshot {
    lists: [Vec<Proxy>; 4],
}

impl ResultSnapshot {
    /// Endpoints that passed `protocol`, in the order they succeeded
    pub fn get(&self, protocol: ProxyType) -> &[Proxy] {
        &self.lists[protocol.index()]
    }

    /// Every list concatenated in HTTP, HTTPS, SOCKS4, SOCKS5 order
    pub fn all_valid(&self) -> Vec<&Proxy> {
        self.lists.iter().flatten().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.iter().all(Vec::is_empty)
    }
}

/// Point-in-time view of the scan counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub total: u64,
    pub done: u64,
    pub found: u64,
    pub failed: u64,
    /// Successes per protocol, indexed by [`ProxyType::index`]
    pub ok: [u64; 4],
    pub last: Option<Proxy>,
}

impl StatsSnapshot {
    pub fn ok(&self, protocol: ProxyType) -> u64 {
        self.ok[protocol.index()]
    }
}
