extern crate pest;
#[macro_use]
extern crate pest_derive;

pub mod client;
mod internal;
pub mod prometheus;
mod public;
pub use public::*;
pub use internal::MetricUpgrade;
pub use prometheus::{parse_bytes, parse_exposition, parse_prometheus, parse_reader};
