//! Process-wide default-instance holders
//!
//! Every registry and service takes its collaborators by injection; the
//! lazily-created default instances exist only so callers can omit the
//! wiring. Each holder is replaceable and resettable, and internal logic
//! never reaches for it directly.

use std::sync::{Arc, PoisonError, RwLock};

pub(crate) struct DefaultHolder<T> {
    slot: RwLock<Option<Arc<T>>>,
}

impl<T> DefaultHolder<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slot: RwLock::new(None),
        }
    }

    /// Current default, creating it with `init` on first access.
    pub(crate) fn get_or_init(&self, init: impl FnOnce() -> T) -> Arc<T> {
        if let Some(existing) = self
            .slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            return Arc::clone(existing);
        }
        let mut guard = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = guard.as_ref() {
            return Arc::clone(existing);
        }
        let created = Arc::new(init());
        *guard = Some(Arc::clone(&created));
        created
    }

    pub(crate) fn replace(&self, value: Arc<T>) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(value);
    }

    pub(crate) fn reset(&self) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static HOLDER: DefaultHolder<u32> = DefaultHolder::new();

    #[test]
    fn test_lazy_replace_reset() {
        HOLDER.reset();
        let first = HOLDER.get_or_init(|| 1);
        assert_eq!(*first, 1);
        // Initializer ignored once a value exists.
        assert_eq!(*HOLDER.get_or_init(|| 2), 1);

        HOLDER.replace(Arc::new(7));
        assert_eq!(*HOLDER.get_or_init(|| 2), 7);

        HOLDER.reset();
        assert_eq!(*HOLDER.get_or_init(|| 3), 3);
        HOLDER.reset();
    }
}
