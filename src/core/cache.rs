use futures::future::{BoxFuture, FutureExt, Shared};
use std::fmt;
use std::future::Future;
use std::sync::{Mutex, PoisonError};

pub type SharedFetch<T> = Shared<BoxFuture<'static, T>>;

/// 記住第一次 fetch 的 future，之後的呼叫者都拿到同一個結果 (值或錯誤)
pub struct MemoCache<T: Clone> {
    slot: Mutex<Option<SharedFetch<T>>>,
}

impl<T> MemoCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Returns the in-flight or settled fetch, starting `fetch` only when the
    /// cache is empty.
    pub fn get_or_fetch<F, Fut>(&self, fetch: F) -> SharedFetch<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T> + Send + 'static,
    {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = slot.as_ref() {
            return existing.clone();
        }
        let shared = fetch().boxed().shared();
        *slot = Some(shared.clone());
        shared
    }

    pub fn invalidate(&self) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = None;
    }

    pub fn is_primed(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Settled value, if the fetch already completed.
    pub fn peek(&self) -> Option<T> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .and_then(|shared| shared.peek().cloned())
    }
}

impl<T> Default for MemoCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> fmt::Debug for MemoCache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let primed = self
            .slot
            .lock()
            .map(|slot| slot.is_some())
            .unwrap_or(false);
        f.debug_struct("MemoCache").field("primed", &primed).finish()
    }
}
