//! Interior-mutability cell guarding the pool state.
//!
//! Every public pool operation acquires the cell exactly once for its full
//! duration; internal helpers take the borrowed state directly, so the cell
//! is never re-entered. Without the `thread-safe` feature the cell is a
//! `RefCell`; with it, a `Mutex`, making the pool usable from multiple
//! threads.

#[cfg(not(feature = "thread-safe"))]
mod imp {
    use std::cell::{RefCell, RefMut};

    pub struct Shared<T> {
        inner: RefCell<T>,
    }

    impl<T> Shared<T> {
        pub fn new(value: T) -> Self {
            Self {
                inner: RefCell::new(value),
            }
        }

        pub fn lock(&self) -> RefMut<'_, T> {
            self.inner.borrow_mut()
        }
    }
}

#[cfg(feature = "thread-safe")]
mod imp {
    use std::sync::{Mutex, MutexGuard};

    pub struct Shared<T> {
        inner: Mutex<T>,
    }

    impl<T> Shared<T> {
        pub fn new(value: T) -> Self {
            Self {
                inner: Mutex::new(value),
            }
        }

        pub fn lock(&self) -> MutexGuard<'_, T> {
            self.inner.lock().unwrap_or_else(|e| e.into_inner())
        }
    }
}

pub use imp::Shared;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_acquisitions() {
        let cell = Shared::new(0u32);
        *cell.lock() += 1;
        *cell.lock() += 1;
        assert_eq!(*cell.lock(), 2);
    }
}
