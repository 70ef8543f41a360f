//! Per-key async mutexes.
//!
//! Entries are held weakly: once the last guard for a key drops, the mutex is
//! freed and its slot is swept on the next insertion.

use std::{
  collections::HashMap,
  sync::{Arc, Mutex, PoisonError, Weak},
};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

#[derive(Debug, Default)]
pub(crate) struct KeyedLocks {
  slots: Mutex<HashMap<String, Weak<AsyncMutex<()>>>>,
}

impl KeyedLocks {
  /// Wait for exclusive access to `key`.
  pub(crate) async fn lock(&self, key: &str) -> OwnedMutexGuard<()> {
    let mutex = {
      let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
      match slots.get(key).and_then(Weak::upgrade) {
        Some(existing) => existing,
        None => {
          slots.retain(|_, slot| slot.strong_count() > 0);
          let fresh = Arc::new(AsyncMutex::new(()));
          slots.insert(key.to_owned(), Arc::downgrade(&fresh));
          fresh
        }
      }
    };
    mutex.lock_owned().await
  }

  #[cfg(test)]
  fn live_slots(&self) -> usize {
    let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
    slots.values().filter(|slot| slot.strong_count() > 0).count()
  }
}

#[cfg(test)]
mod tests {
  use std::{sync::atomic::{AtomicUsize, Ordering}, time::Duration};

  use super::*;

  #[tokio::test]
  async fn same_key_is_exclusive() {
    let locks = Arc::new(KeyedLocks::default());
    let inside = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let mut tasks = Vec::new();
    for _ in 0..8 {
      let (locks, inside, peak) = (locks.clone(), inside.clone(), peak.clone());
      tasks.push(tokio::spawn(async move {
        let _guard = locks.lock("U-1").await;
        let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
        peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(2)).await;
        inside.fetch_sub(1, Ordering::SeqCst);
      }));
    }
    for task in tasks {
      task.await.unwrap();
    }
    assert_eq!(peak.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn different_keys_do_not_block() {
    let locks = KeyedLocks::default();
    let _a = locks.lock("U-1").await;
    let b = tokio::time::timeout(Duration::from_millis(50), locks.lock("U-2")).await;
    assert!(b.is_ok());
  }

  #[tokio::test]
  async fn released_slots_are_freed() {
    let locks = KeyedLocks::default();
    drop(locks.lock("U-1").await);
    assert_eq!(locks.live_slots(), 0);
    let _held = locks.lock("U-2").await;
    assert_eq!(locks.live_slots(), 1);
  }
}
