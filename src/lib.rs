//! Field mapping services built on the geometry, drawing, and tile crates.
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `AppConfig` assembled from the environment |
//! | [`state`] | Tile cache and downloader shared by commands |
//! | [`services::boundary`] | Live proximity alerts against an armed boundary |
//! | [`services::trail`] | Breadcrumb trail and implement coverage |

pub mod config;
pub mod services;
pub mod state;
