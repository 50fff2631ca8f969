//! Coalescing of concurrent fetches for the same resource key.
//!
//! A second caller for a key with a request already in flight awaits
//! the first caller's future instead of issuing a duplicate request.
//! Entries are removed as soon as the call settles, so later callers
//! start fresh. The map is an explicit, injectable object — never
//! hidden module state — so its lifetime is the owner's.

use std::collections::HashMap;

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use parking_lot::Mutex;

type SharedCall<T, E> = Shared<BoxFuture<'static, Result<T, E>>>;

/// Deduplicates in-flight calls keyed by resource id.
///
/// `T` and `E` must be `Clone` because every joined caller receives
/// its own copy of the settled result.
pub struct Singleflight<T, E> {
    in_flight: Mutex<HashMap<String, SharedCall<T, E>>>,
}

impl<T, E> Singleflight<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Join the in-flight call for `key`, or start one with `make`.
    pub async fn run<F>(&self, key: &str, make: F) -> Result<T, E>
    where
        F: FnOnce() -> BoxFuture<'static, Result<T, E>>,
    {
        let call = {
            let mut map = self.in_flight.lock();
            match map.get(key) {
                Some(existing) => existing.clone(),
                None => {
                    let call = make().shared();
                    map.insert(key.to_string(), call.clone());
                    call
                }
            }
        };

        let result = call.clone().await;

        // Drop the entry once settled, but only if it is still ours —
        // a later caller may have started a fresh flight under the key.
        let mut map = self.in_flight.lock();
        if map.get(key).is_some_and(|current| current.ptr_eq(&call)) {
            map.remove(key);
        }

        result
    }

    /// Number of calls currently in flight.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.lock().len()
    }
}

impl<T, E> Default for Singleflight<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
