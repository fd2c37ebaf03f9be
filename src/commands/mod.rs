mod config_cmd;
mod log_cmd;
mod report;
mod watch;

pub use config_cmd::ConfigCommand;
pub use log_cmd::LogCommand;
pub use report::ReportCommand;
pub use watch::WatchCommand;

use clap::ValueEnum;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
