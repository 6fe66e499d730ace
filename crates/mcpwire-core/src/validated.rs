//! Validated construction.
//!
//! Every message type is built the same way: a constructor takes the required
//! arguments, an ordered list of configuration steps is applied, and the
//! finished value is validated once. The first failing step aborts the whole
//! construction and the half-built value is dropped.
//!
//! ```
//! use mcpwire_core::{ConstructionError, Validated, build};
//!
//! #[derive(Debug)]
//! struct Window {
//!     width: u32,
//!     title: Option<String>,
//! }
//!
//! enum WindowStep {
//!     Title(String),
//! }
//!
//! impl Validated for Window {
//!     type Step = WindowStep;
//!
//!     fn apply(&mut self, step: WindowStep) -> Result<(), ConstructionError> {
//!         match step {
//!             WindowStep::Title(t) if t.is_empty() => Err(ConstructionError::empty("title")),
//!             WindowStep::Title(t) => {
//!                 self.title = Some(t);
//!                 Ok(())
//!             }
//!         }
//!     }
//!
//!     fn validate(&self) -> Result<(), ConstructionError> {
//!         if self.width == 0 {
//!             return Err(ConstructionError::new("width", "must be positive"));
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let ok = build(Window { width: 80, title: None }, [WindowStep::Title("main".into())]);
//! assert!(ok.is_ok());
//!
//! let bad = build(Window { width: 80, title: None }, [WindowStep::Title(String::new())]);
//! assert!(bad.is_err());
//! ```

use crate::error::ConstructionError;
use crate::logging::targets;

/// A value that can only be observed after passing its own validation.
pub trait Validated: Sized {
    /// One configuration command for this type.
    type Step;

    /// Applies one step, checking the step's own input.
    fn apply(&mut self, step: Self::Step) -> Result<(), ConstructionError>;

    /// Cross-field checks on the finished value.
    ///
    /// Runs exactly once after all steps, and again on every decoded value.
    fn validate(&self) -> Result<(), ConstructionError> {
        Ok(())
    }
}

/// Applies `steps` to `initial` in order and validates the result.
///
/// Returns the finished value only if every step and the final validation
/// succeed.
pub fn build<T, I>(initial: T, steps: I) -> Result<T, ConstructionError>
where
    T: Validated,
    I: IntoIterator<Item = T::Step>,
{
    let mut value = initial;
    for step in steps {
        if let Err(err) = value.apply(step) {
            log::debug!(
                target: targets::BUILD,
                "{} step rejected: {err}",
                std::any::type_name::<T>()
            );
            return Err(err);
        }
    }
    if let Err(err) = value.validate() {
        log::debug!(
            target: targets::BUILD,
            "{} failed validation: {err}",
            std::any::type_name::<T>()
        );
        return Err(err);
    }
    Ok(value)
}

/// Rejects NaN and values outside `[min, max]`.
pub fn check_range(field: &str, value: f64, min: f64, max: f64) -> Result<(), ConstructionError> {
    if value.is_nan() || value < min || value > max {
        return Err(ConstructionError::out_of_range(
            field,
            value,
            &format!("between {min} and {max}"),
        ));
    }
    Ok(())
}

/// Rejects an empty string.
pub fn check_non_empty(field: &str, value: &str) -> Result<(), ConstructionError> {
    if value.is_empty() {
        return Err(ConstructionError::empty(field));
    }
    Ok(())
}
