//! Utility functions shared across symdex.
//!
//! ## Modules
//!
//! - [`app_data`] - User configuration file (XDG-compliant location)
//! - [`escape`] - Decoding of escaped generated keys and case folding
//!
//! ```
//! use symdex::utils::{fold_case, unescape_key};
//!
//! assert_eq!(unescape_key("abs_28float_29"), "abs(float)");
//! assert_eq!(fold_case("Atomic_Int"), "atomic_int");
//! ```

pub mod app_data;
pub mod escape;

pub use app_data::*;
pub use escape::*;
