//! Settings of the tool itself (as opposed to the simulation configuration
//! document, see [`crate::simulation`]): which workspace the pipeline works
//! in and how to log.
//!
//! Your starting point should probably be [`Settings::load_from_default_path`].
//!
//! # Internals
//! Settings are loaded in two steps. The TOML file is first deserialized
//! into the [`UnresolvedSettings`] structure, which is then resolved
//! (see [`ResolvableConfiguration`][crate::traits::ResolvableConfiguration])
//! into the validated [`Settings`]. Resolution is where e.g. log level filters
//! are checked and the `{WORKSPACE}` / `{EMS_DIRECTORY}` placeholders of
//! the log directory are substituted.

#![allow(rustdoc::private_intra_doc_links)]

mod structure;
mod utilities;

pub use structure::*;
