//!
//! # Error-Helper Utilities
//!
//! Shared failure plumbing for the tree-walkers which convert between
//! in-memory models and their serialized documents.
//!
//! ```rust
//! use arch21utils::error::{ErrorHelper, Unwrapper};
//!
//! /// A walker which reports the name of the item it is working on.
//! struct Walker {
//!     current: String,
//! }
//! impl ErrorHelper for Walker {
//!     type Error = String;
//!
//!     fn err(&self, msg: impl Into<String>) -> Self::Error {
//!         format!("{} (while reading \"{}\")", msg.into(), self.current)
//!     }
//! }
//! impl Walker {
//!     fn width(&self, txt: &str) -> Result<usize, String> {
//!         let w: usize = txt.parse().unwrapper(self, "invalid width")?;
//!         self.assert(w > 0, "width must be positive")?;
//!         Ok(w)
//!     }
//! }
//!
//! let w = Walker { current: "lut4".into() };
//! assert_eq!(w.width("4"), Ok(4));
//! assert_eq!(w.width("0"), Err("width must be positive (while reading \"lut4\")".into()));
//! ```
//!

///
/// # ErrorHelper
///
/// Implementers carry whatever state locates a failure (typically a context stack),
/// and attach it in the required `err` method.
/// Everything else is provided in terms of `err`.
///
pub trait ErrorHelper {
    type Error;

    /// Create and return a [Self::Error] value.
    fn err(&self, msg: impl Into<String>) -> Self::Error;
    /// Return failure
    fn fail<T>(&self, msg: impl Into<String>) -> Result<T, Self::Error> {
        Err(self.err(msg))
    }
    /// Unwrap the [Option] `opt` if it is [Some], and return our error if not.
    fn unwrap<T>(&self, opt: Option<T>, msg: impl Into<String>) -> Result<T, Self::Error> {
        match opt {
            Some(val) => Ok(val),
            None => self.fail(msg),
        }
    }
    /// Assert a boolean condition. Returns through `self.fail` if it is not satisfied.
    fn assert(&self, b: bool, msg: impl Into<String>) -> Result<(), Self::Error> {
        if b {
            Ok(())
        } else {
            self.fail(msg)
        }
    }
}

///
/// # Unwrapper
///
/// Post-fix application of an [ErrorHelper] to [Option]s and [Result]s.
/// Import the trait, then call `.unwrapper(helper, msg)` in place of `?`-less unwrapping.
/// [Result] errors are replaced by the helper's error, with the original's message appended.
///
pub trait Unwrapper {
    type Ok;
    fn unwrapper<H>(self, helper: &H, msg: impl Into<String>) -> Result<Self::Ok, H::Error>
    where
        H: ErrorHelper;
}

impl<T> Unwrapper for Option<T> {
    type Ok = T;
    fn unwrapper<H>(self, helper: &H, msg: impl Into<String>) -> Result<Self::Ok, H::Error>
    where
        H: ErrorHelper,
    {
        match self {
            Some(t) => Ok(t),
            None => helper.fail(msg),
        }
    }
}

impl<T, E: std::fmt::Display> Unwrapper for Result<T, E> {
    type Ok = T;
    fn unwrapper<H>(
        self,
        helper: &H,
        msg: impl Into<String>,
    ) -> Result<<Self as Unwrapper>::Ok, H::Error>
    where
        H: ErrorHelper,
    {
        match self {
            Ok(t) => Ok(t),
            Err(e) => helper.fail(format!("{}: {}", msg.into(), e)),
        }
    }
}
