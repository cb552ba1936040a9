// launchdeck: live social feed normalization and token launch tooling
//
// This is the library root. Each module corresponds to one stage of the
// feed → token → deploy flow.

pub mod api;
pub mod config;
pub mod deploy;
pub mod feed;
pub mod output;
pub mod token;
