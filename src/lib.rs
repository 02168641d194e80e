//! Terminal resource monitor built on the kernel's cumulative `/proc` counters.
//!
//! [`system`] turns two consecutive counter samples into usage figures; everything else
//! is the interactive front end around it.

pub mod action;
pub mod app;
pub mod config;
pub mod event;
pub mod format;
pub mod logging;
pub mod system;
pub mod ui;
