// src/core/context_data.rs
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

/// Context shared by every handler of one pipeline run.
///
/// Clones are handles to the same data, so a caller keeps one to read results
/// after [`Registry::run`](crate::Registry::run) returns. Guards are blocking
/// `parking_lot` guards: copy what a step needs out of them before awaiting.
#[derive(Debug)]
pub struct ContextData<T: Send + Sync + 'static> {
  inner: Arc<RwLock<T>>,
}

impl<T: Send + Sync + 'static> ContextData<T> {
  pub fn new(data: T) -> Self {
    Self {
      inner: Arc::new(RwLock::new(data)),
    }
  }

  pub fn read(&self) -> RwLockReadGuard<'_, T> {
    self.inner.read()
  }

  pub fn write(&self) -> RwLockWriteGuard<'_, T> {
    self.inner.write()
  }

  /// Runs `f` under a read lock and returns its result; the lock is released
  /// before this returns.
  pub fn inspect<R>(&self, f: impl FnOnce(&T) -> R) -> R {
    f(&self.inner.read())
  }

  /// Runs `f` under a write lock.
  pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
    f(&mut self.inner.write())
  }
}

impl<T: Send + Sync + 'static> Clone for ContextData<T> {
  fn clone(&self) -> Self {
    Self {
      inner: Arc::clone(&self.inner),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::ContextData;

  #[test]
  fn clones_share_state() {
    let ctx = ContextData::new(vec![1u32]);
    let other = ctx.clone();
    other.update(|v| v.push(2));
    assert_eq!(ctx.inspect(|v| v.iter().sum::<u32>()), 3);
    assert_eq!(ctx.read().len(), 2);
  }
}
