use clap::{Args, Subcommand};

use super::OutputFormat;
use crate::api::RemoteApi;
use crate::models::NewLogRequest;
use crate::sync::SyncManager;

#[derive(Args)]
pub struct LogCommand {
    #[command(subcommand)]
    pub command: LogSubcommand,
}

#[derive(Subcommand)]
pub enum LogSubcommand {
    /// List logs (falls back to cached data when offline)
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show a single log's detail
    Show {
        /// Log ID
        id: i64,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Record a new log (requires connectivity)
    Add {
        /// Calendar day, YYYY-MM-DD
        #[arg(long)]
        date: String,

        /// Calories
        #[arg(long)]
        amount: f64,

        /// "intake" or "burn"
        #[arg(long)]
        kind: String,

        /// Free-text category, e.g. "lunch" or "running"
        #[arg(long, default_value = "")]
        category: String,

        /// Free-text description
        #[arg(long, default_value = "")]
        description: String,
    },

    /// Delete a log (requires connectivity)
    Delete {
        /// Log ID
        id: i64,
    },
}

impl LogCommand {
    pub async fn run<A: RemoteApi>(
        &self,
        manager: &SyncManager<A>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            LogSubcommand::List { format } => {
                let listing = manager.list_logs().await?;
                if listing.is_offline {
                    eprintln!("Offline: showing cached data.");
                }
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&listing.records)?);
                    }
                    OutputFormat::Text => {
                        if listing.records.is_empty() {
                            println!("No logs recorded.");
                        }
                        for record in &listing.records {
                            println!("{}", record);
                        }
                    }
                }
            }
            LogSubcommand::Show { id, format } => {
                let record = manager.get_log(*id).await?;
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&record)?);
                    }
                    OutputFormat::Text => println!("{}", record),
                }
            }
            LogSubcommand::Add {
                date,
                amount,
                kind,
                category,
                description,
            } => {
                let new = NewLogRequest {
                    date: date.clone(),
                    amount: *amount,
                    kind: kind.clone(),
                    category: category.clone(),
                    description: description.clone(),
                };
                let created = manager.create_log(&new).await?;
                println!("Created {}", created);
            }
            LogSubcommand::Delete { id } => {
                let deleted = manager.delete_log(*id).await?;
                println!("Deleted {}", deleted);
            }
        }
        Ok(())
    }
}
