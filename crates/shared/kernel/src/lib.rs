//! Shared plumbing every slice builds on: ids, config loading, security
//! primitives, and the server-side helpers. Keep this crate lightweight.
//!
//! ## ID generation
//! `safe_nanoid!` yields short URL-safe ids free of look-alike glyphs:
//! ```rust
//! # use slms_kernel::safe_nanoid;
//! let id = safe_nanoid!();
//! assert_eq!(id.len(), 12);
//! ```
//!
//! ## Config loading
//! ```rust,no_run
//! use slms_kernel::config::load_config;
//! use slms_kernel::domain::config::ApiConfig;
//!
//! let cfg: ApiConfig = load_config(Some("server")).unwrap();
//! ```

pub mod config;
pub mod prelude;
pub mod security;
pub mod server;

// Glyphs that are easy to misread (I, O, l, 0, 1) are left out.
pub const SAFE_ALPHABET: &[char; 55] = &[
    '2', '3', '4', '5', '6', '7', '8', '9', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'J', 'K', 'L',
    'M', 'N', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', 'a', 'b', 'c', 'd', 'e', 'f',
    'g', 'h', 'j', 'k', 'm', 'n', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

pub use slms_domain as domain;
pub use nanoid::nanoid;

/// Produces a `NanoID` drawn from [`SAFE_ALPHABET`], 12 characters by default.
#[macro_export]
macro_rules! safe_nanoid {
    () => {
        $crate::nanoid!(12, $crate::SAFE_ALPHABET)
    };
    ($size:expr) => {
        $crate::nanoid!($size, $crate::SAFE_ALPHABET)
    };
}
