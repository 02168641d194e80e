pub mod collector;
pub mod cpu;
pub mod error;
pub mod memory;
pub mod platform;
pub mod process;
pub mod sampler;
pub mod source;
pub mod uptime;
