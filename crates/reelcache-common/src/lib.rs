//! Reelcache-Common: shared error taxonomy and result types.
//!
//! Every failure a lookup can surface lives in one [`Error`] enum so callers
//! handle a single reportable category while keeping a distinguishing reason
//! for diagnostics.
//!
//! # Examples
//!
//! ```
//! use reelcache_common::{Error, Result};
//!
//! fn example() -> Result<()> {
//!     Err(Error::no_results("title=Up year=2009"))
//! }
//! ```

pub mod error;

pub use error::{Error, Result};
