//! Storage for cached upstream payloads and materialized records.
//!
//! ## Directory Structure
//!
//! ```text
//! {cache_path}/
//! └── https%3A%2F%2F...        # one file per cached URL, percent-encoded
//!
//! {dest_folder}/
//! └── 2016-2017/
//!     └── 1/
//!         ├── examTimetableRaw.json   # per-job scrape output
//!         └── CS1010/
//!             └── module.json         # reconciled module record
//! ```

pub mod cache;
pub mod tree;

pub use cache::{CacheAge, CacheStore, PayloadKind};
pub use tree::{load_tree, load_tree_sync, write_record};
