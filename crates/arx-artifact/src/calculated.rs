//! Compute-once value cell
//!
//! [`CalculatedValue`] holds a calculation that runs at most once. Concurrent
//! callers block on the running calculation and then share its result,
//! success or failure.

use crate::error::ResolveError;
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use std::fmt::{self, Debug, Formatter};

type Calculation<T> = Box<dyn FnOnce() -> Result<T, ResolveError> + Send>;

/// Memoized, thread-safe, at-most-once calculation
///
/// # Invariants
/// - The calculation closure is invoked at most once
/// - Once finalized, the stored result never changes
pub struct CalculatedValue<T> {
    display_name: String,
    value: OnceCell<Result<T, ResolveError>>,
    calculation: Mutex<Option<Calculation<T>>>,
}

impl<T: Send + Sync> CalculatedValue<T> {
    /// Create value computed on first use
    #[must_use]
    pub fn new<F>(display_name: impl Into<String>, calculation: F) -> Self
    where
        F: FnOnce() -> Result<T, ResolveError> + Send + 'static,
    {
        Self {
            display_name: display_name.into(),
            value: OnceCell::new(),
            calculation: Mutex::new(Some(Box::new(calculation))),
        }
    }

    /// Create value that is already available
    #[must_use]
    pub fn ready(display_name: impl Into<String>, value: T) -> Self {
        Self {
            display_name: display_name.into(),
            value: OnceCell::with_value(Ok(value)),
            calculation: Mutex::new(None),
        }
    }

    /// Create value that has already failed
    #[must_use]
    pub fn failed(display_name: impl Into<String>, failure: ResolveError) -> Self {
        Self {
            display_name: display_name.into(),
            value: OnceCell::with_value(Err(failure)),
            calculation: Mutex::new(None),
        }
    }

    /// Display name used in diagnostics
    #[inline]
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Whether the result is available without running anything
    #[inline]
    #[must_use]
    pub fn is_finalized(&self) -> bool {
        self.value.get().is_some()
    }

    /// Run the calculation unless it already ran; blocks while another thread runs it
    pub fn finalize_if_not_already(&self) {
        self.result();
    }

    /// Result of the calculation, running it if needed
    ///
    /// # Errors
    /// Returns the captured failure of the calculation
    pub fn get(&self) -> Result<&T, ResolveError> {
        self.result().as_ref().map_err(Clone::clone)
    }

    /// Result if already finalized
    #[inline]
    #[must_use]
    pub fn try_get(&self) -> Option<&Result<T, ResolveError>> {
        self.value.get()
    }

    fn result(&self) -> &Result<T, ResolveError> {
        self.value.get_or_init(|| {
            let calculation = self.calculation.lock().take();
            match calculation {
                Some(calculation) => {
                    tracing::trace!(value = %self.display_name, "calculating value");
                    calculation()
                }
                // Only reachable when a previous calculation panicked.
                None => Err(ResolveError::CalculationPanicked(self.display_name.clone())),
            }
        })
    }
}

impl<T: Debug> Debug for CalculatedValue<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("CalculatedValue")
            .field("display_name", &self.display_name)
            .field("value", &self.value.get())
            .finish_non_exhaustive()
    }
}
