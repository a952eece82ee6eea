//! # Logging Module
//!
//! Output channels of the `fileheader` binary. Three kinds of output leave a
//! run:
//! - Per-file progress ("Using config", "Skipping: ...") through
//!   [`verbose_log!`], shown only with `-v` and written to stderr
//! - Results worth showing by default through [`info_log!`], silenced by `-q`
//! - Engine diagnostics as `tracing` events, routed by [`init_tracing`]
//!
//! The header engine never prints; it only emits `tracing` events.
//!
//! ```rust
//! use fileheader::logging::{ColorMode, set_verbose};
//! use fileheader::{info_log, verbose_log};
//!
//! set_verbose();
//! ColorMode::Never.apply();
//!
//! verbose_log!("Resolving comment token for: {}", "rust");
//! info_log!("Header inserted into: {}", "main.rs");
//! ```

mod modes;

pub use modes::{ColorMode, filter_directive, init_tracing, is_quiet, is_verbose, set_quiet, set_verbose};
use owo_colors::{OwoColorize, Stream};

/// `eprintln!` gated on `-v`.
#[macro_export]
macro_rules! verbose_log {
    ($($arg:tt)*) => {
        if $crate::logging::is_verbose() {
            eprintln!($($arg)*);
        }
    };
}

/// A highlighted stdout line that `-q` suppresses, such as the path of a
/// generated report.
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {
        if !$crate::logging::is_quiet() {
            $crate::logging::print_info_log(&format!($($arg)*));
        }
    };
}

/// Backs [`info_log!`]; not meant to be called directly.
#[doc(hidden)]
pub fn print_info_log(message: &str) {
  println!("{}", message.if_supports_color(Stream::Stdout, |m| m.yellow()));
}
