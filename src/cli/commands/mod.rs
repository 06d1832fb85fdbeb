//! CLI command implementations.

mod config;
mod doctor;
mod init;
mod process;
mod serve;

pub use config::run_config;
pub use doctor::run_doctor;
pub use init::run_init;
pub use process::run_process;
pub use serve::run_serve;
