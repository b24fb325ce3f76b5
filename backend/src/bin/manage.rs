//! Team Management System - management commands

use clap::{Parser, Subcommand};

use tms::config::Config;
use tms::services::TaskQueue;
use tms::{db, telemetry};
use shared::models::EmailJob;

#[derive(Parser, Debug)]
#[command(name = "tms-manage")]
#[command(about = "Management commands for the Team Management System")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply pending database migrations and exit
    Migrate,

    /// Print a greeting
    Greet {
        /// Who to greet
        name: Option<String>,
    },

    /// Queue an email for the worker to deliver
    SendEmail {
        /// Recipient address (repeatable)
        #[arg(long = "to", required = true)]
        to: Vec<String>,

        #[arg(long)]
        subject: String,

        #[arg(long)]
        message: String,

        /// Sender address; defaults to email.from_email
        #[arg(long)]
        from: Option<String>,
    },
}

fn greeting(name: Option<&str>) -> String {
    match name {
        Some(name) => format!("Thikcha, {}", name),
        None => "Thikcha".to_string(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Command::Greet { name } => {
            println!("{}", greeting(name.as_deref()));
        }
        Command::Migrate => {
            telemetry::init_tracing(telemetry::json_logs_requested());
            let config = Config::load()?;
            let pool = db::connect(&config.database).await?;
            db::run_migrations(&pool).await?;
            pool.close().await;
        }
        Command::SendEmail {
            to,
            subject,
            message,
            from,
        } => {
            telemetry::init_tracing(telemetry::json_logs_requested());
            let config = Config::load()?;
            for address in &to {
                shared::validation::validate_email(address)
                    .map_err(|m| anyhow::anyhow!("{}: {}", address, m))?;
            }

            let queue = TaskQueue::new(&config.redis.url, config.worker.queue_name.clone())?;
            let job = EmailJob::new(subject, message, from, to);
            queue.enqueue(&job).await?;
            println!("Queued email job {}", job.id);
        }
    }

    Ok(())
}
