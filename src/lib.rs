//! fmodel: functional model manager
//!
//! Layers, inner to outer:
//! - [`domain`]: element records, `$XX$` note codec, override collapse, tree builder
//! - [`application`]: catalog entries, interchange and model services
//! - [`infrastructure`]: file system and model store boundaries, service wiring
//! - [`cli`]: argument parsing and command dispatch

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
