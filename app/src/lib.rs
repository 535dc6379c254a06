//! `vmess-bench` command line: subscription parsing, latency benchmark and
//! resource download.

pub mod cli;
pub mod logging;
