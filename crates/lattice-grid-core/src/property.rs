//! Property system for Lattice Grid.
//!
//! A [`Property<T>`] is a value cell with change detection. Setting a value
//! reports whether it actually changed, so the owner only emits notification
//! signals for real transitions.
//!
//! # Example
//!
//! ```
//! use lattice_grid_core::property::Property;
//!
//! let term = Property::new(String::new());
//! assert!(term.set("ann".to_string()));
//! assert!(!term.set("ann".to_string()));
//! assert_eq!(term.get(), "ann");
//! ```

use std::fmt;

use parking_lot::RwLock;

/// A value cell that reports whether writes change it.
///
/// `Property<T>` uses interior mutability with `RwLock` and is `Send + Sync`
/// when `T` is.
pub struct Property<T> {
    value: RwLock<T>,
}

impl<T: Clone> Property<T> {
    /// Creates a cell holding `value`.
    pub fn new(value: T) -> Self {
        Self {
            value: RwLock::new(value),
        }
    }

    /// Clones the current value.
    pub fn get(&self) -> T {
        self.value.read().clone()
    }

    /// Reads the value in place.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        f(&self.value.read())
    }

    /// Overwrites the value without comparing.
    pub fn set_silent(&self, value: T) {
        *self.value.write() = value;
    }
}

impl<T: Clone + PartialEq> Property<T> {
    /// Stores `value`, returning `true` if it differs from the old value.
    pub fn set(&self, value: T) -> bool {
        let mut current = self.value.write();
        if *current != value {
            *current = value;
            true
        } else {
            false
        }
    }

    /// Stores `value`, returning the previous value when they differ.
    pub fn replace(&self, value: T) -> Option<T> {
        let mut current = self.value.write();
        if *current != value {
            Some(std::mem::replace(&mut *current, value))
        } else {
            None
        }
    }

    /// Mutates the value in place, returning `true` if that changed it.
    pub fn update<F>(&self, f: F) -> bool
    where
        F: FnOnce(&mut T),
    {
        let mut current = self.value.write();
        let before = current.clone();
        f(&mut current);
        *current != before
    }
}

impl<T: Clone + Default> Default for Property<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Property").field(&*self.value.read()).finish()
    }
}
