pub mod config;
pub mod ipc;
pub mod mode;
pub mod palette;
pub mod pen;
