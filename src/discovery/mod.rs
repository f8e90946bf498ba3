//! Turning command line inputs into the flat list of files to bundle.
//!
//! `walk` expands file and directory arguments into absolute leaf paths, and `root` derives
//! the common ancestor used to give every entry a short, stable display name.

mod root;
mod walk;

pub use root::{common_root, display_name};
pub use walk::{ResolvedInputs, resolve_inputs};
pub(crate) use walk::skip_or_fail;
