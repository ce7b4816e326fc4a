//! Hardware Abstraction Layer implementations.
//!
//! This module contains concrete implementations of the traits
//! defined in [`crate::traits`] for various platforms.
//!
//! # Available Implementations
//!
//! - `mock`: Test implementations for desktop development
//! - `host`: Standard-library delay for running the worker on a desktop

#[cfg(feature = "std")]
pub mod host;
#[cfg(feature = "std")]
pub mod mock;

#[cfg(feature = "std")]
pub use host::*;
#[cfg(feature = "std")]
pub use mock::*;
