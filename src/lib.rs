//! Library entrypoint for gitian-build.
//!
//! The primary interface is the `gitian-build` binary. The library target
//! exposes the build steps to integration tests.

pub mod config;
pub mod docker;
pub mod github;
pub mod output;
pub mod pipeline;
pub mod platform;
pub mod precheck;
pub mod select;
