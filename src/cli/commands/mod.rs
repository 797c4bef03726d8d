//! CLI command implementations.

mod ask;
mod chat;
mod config;
mod doctor;
mod episodes;
mod init;
mod process;
mod serve;
mod summary;
mod sync;

pub use ask::run_ask;
pub use chat::run_chat;
pub use config::run_config;
pub use doctor::run_doctor;
pub use episodes::run_episodes;
pub use init::run_init;
pub use process::run_process;
pub use serve::run_serve;
pub use summary::run_summary;
pub use sync::run_sync;
