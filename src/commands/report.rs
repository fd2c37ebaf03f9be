use clap::{Args, Subcommand};

use super::OutputFormat;
use crate::api::RemoteApi;
use crate::reports;
use crate::sync::SyncManager;

/// Reports always use a fresh full dataset from the server; they are
/// unavailable offline by design.
#[derive(Args)]
pub struct ReportCommand {
    #[command(subcommand)]
    pub command: ReportSubcommand,
}

#[derive(Subcommand)]
pub enum ReportSubcommand {
    /// Top 3 categories by total calories
    Categories {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Net calories per month (intake minus burn)
    Monthly {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl ReportCommand {
    pub async fn run<A: RemoteApi>(
        &self,
        manager: &SyncManager<A>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let logs = manager.list_all_logs().await?;

        match &self.command {
            ReportSubcommand::Categories { format } => {
                let top = reports::top_categories(&logs);
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&top)?);
                    }
                    OutputFormat::Text => {
                        println!("Top categories by calories");
                        println!("==========================\n");
                        if top.is_empty() {
                            println!("No data available.");
                        }
                        for (rank, entry) in top.iter().enumerate() {
                            println!("{}. {}: {:.1} cal", rank + 1, entry.category, entry.total);
                        }
                    }
                }
            }
            ReportSubcommand::Monthly { format } => {
                let months = reports::monthly_net(&logs);
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&months)?);
                    }
                    OutputFormat::Text => {
                        println!("Monthly net calories");
                        println!("====================\n");
                        if months.is_empty() {
                            println!("No data available.");
                        }
                        for entry in &months {
                            println!("{}: {:+.1} cal", entry.month, entry.net);
                        }
                    }
                }
            }
        }
        Ok(())
    }
}
