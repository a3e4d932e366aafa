//! Cache query operations.
//!
//! Each submodule provides query functions for a specific area:
//!
//! - `movies` - Movie lookups and the transactional insert/merge
//! - `memos` - Remembered search strings

pub mod memos;
pub mod movies;
