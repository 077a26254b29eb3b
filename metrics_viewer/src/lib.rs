//! Poll, parse and aggregate metrics in the OpenMetrics text format.
//!
//! This library supports the metrics-viewer binary found elsewhere in this
//! project. A single [`poller::Poller`] drives a fetch, parse, filter and
//! aggregate cycle against exactly one [`source::Source`] and publishes every
//! cycle's result as an immutable [`model::Snapshot`].

#![deny(clippy::all)]
#![deny(clippy::cargo)]
#![deny(clippy::pedantic)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
#![deny(clippy::dbg_macro)]
#![deny(unused_extern_crates)]
#![deny(unused_allocation)]
#![deny(unused_assignments)]
#![deny(unused_comparisons)]
#![deny(unreachable_pub)]
#![deny(missing_docs)]
#![deny(missing_copy_implementations)]
#![deny(missing_debug_implementations)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::multiple_crate_versions)]

pub mod aggregate;
pub mod config;
pub mod filter;
pub mod model;
pub mod parser;
pub mod poller;
pub mod signal;
pub mod source;
