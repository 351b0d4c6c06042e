//! Identity-compared callback handles for host notifications.
//!
//! ## Usage
//!
//! Hand closures to the selection container (`on_selection_change`,
//! `on_pointer_down`, ...) and to toolbar items. Handles compare by identity
//! so reinstalling the same handle is observable as "unchanged".

use std::{fmt, sync::Arc};

/// Stable, comparable callback handle for `Fn()`.
///
/// `Callback` compares by identity (`Arc::ptr_eq`).
#[derive(Clone)]
pub struct Callback {
    inner: Arc<dyn Fn() + Send + Sync>,
}

impl Callback {
    /// Create a callback handle from a closure.
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(handler),
        }
    }

    /// Invoke the callback.
    pub fn call(&self) {
        (self.inner)();
    }
}

impl<F> From<F> for Callback
where
    F: Fn() + Send + Sync + 'static,
{
    fn from(handler: F) -> Self {
        Self::new(handler)
    }
}

impl Default for Callback {
    fn default() -> Self {
        Self::new(|| {})
    }
}

impl PartialEq for Callback {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Callback {}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callback({:p})", Arc::as_ptr(&self.inner))
    }
}

/// Stable, comparable callback handle for `Fn(T) -> R`.
pub struct CallbackWith<T, R = ()> {
    inner: Arc<dyn Fn(T) -> R + Send + Sync>,
}

impl<T, R> CallbackWith<T, R> {
    /// Create a callback handle from a closure.
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(T) -> R + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(handler),
        }
    }

    /// Invoke the callback with an argument.
    pub fn call(&self, value: T) -> R {
        (self.inner)(value)
    }
}

impl<T, R, F> From<F> for CallbackWith<T, R>
where
    F: Fn(T) -> R + Send + Sync + 'static,
{
    fn from(handler: F) -> Self {
        Self::new(handler)
    }
}

impl<T, R> Clone for CallbackWith<T, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, R> PartialEq for CallbackWith<T, R> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T, R> Eq for CallbackWith<T, R> {}

impl<T, R> fmt::Debug for CallbackWith<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CallbackWith({:p})", Arc::as_ptr(&self.inner))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn callbacks_compare_by_identity() {
        let a = Callback::new(|| {});
        let b = a.clone();
        let c = Callback::new(|| {});
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn callback_with_forwards_argument() {
        let total = Arc::new(AtomicUsize::new(0));
        let sink = Arc::clone(&total);
        let add = CallbackWith::new(move |n: usize| {
            sink.fetch_add(n, Ordering::SeqCst);
        });
        add.call(3);
        add.clone().call(4);
        assert_eq!(total.load(Ordering::SeqCst), 7);
    }
}
