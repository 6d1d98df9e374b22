//! mailwright CLI tool

#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use commands::{MarkdownCommand, RenderCommand, SendCommand};
use mailwright_cli_lib::load_settings;

#[derive(Parser)]
#[command(name = "mailwright")]
#[command(version)]
#[command(about = "Preview and send templated emails", long_about = None)]
struct Cli {
    /// Configuration file, instead of the standard locations
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct RequestArgs {
    /// Host used to build `base_url`
    #[arg(long)]
    host: Option<String>,
    /// Build `base_url` with https
    #[arg(long)]
    secure: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the HTML and text bodies of a template
    Render {
        /// Template name (resolved under `emails/`)
        template: String,
        /// Template variable, `key=value`
        #[arg(long = "var", value_name = "KEY=VALUE")]
        vars: Vec<String>,
        #[command(flatten)]
        request: RequestArgs,
    },
    /// Render a template and send it
    Send {
        /// Template name (resolved under `emails/`)
        template: String,
        /// Subject line
        #[arg(short, long)]
        subject: String,
        /// Sender address
        #[arg(long)]
        from: Option<String>,
        /// Recipient, repeatable
        #[arg(long)]
        to: Vec<String>,
        /// Carbon-copy recipient, repeatable
        #[arg(long)]
        cc: Vec<String>,
        /// Blind carbon-copy recipient, repeatable
        #[arg(long)]
        bcc: Vec<String>,
        /// Send the plain-text body only
        #[arg(long)]
        text_only: bool,
        /// Template variable, `key=value`
        #[arg(long = "var", value_name = "KEY=VALUE")]
        vars: Vec<String>,
        #[command(flatten)]
        request: RequestArgs,
    },
    /// Send a markdown file
    Markdown {
        /// Markdown source file
        file: PathBuf,
        /// Subject line
        #[arg(short, long)]
        subject: String,
        /// Sender address
        #[arg(long)]
        from: Option<String>,
        /// Recipient, repeatable
        #[arg(long)]
        to: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    mailwright::observability::init_with("warn,mailwright=info")?;

    let settings = load_settings(cli.config.as_deref())?;

    match cli.command {
        Commands::Render {
            template,
            vars,
            request,
        } => {
            RenderCommand::new(template, vars, request.host, request.secure).execute(settings)?;
        }
        Commands::Send {
            template,
            subject,
            from,
            to,
            cc,
            bcc,
            text_only,
            vars,
            request,
        } => {
            let cmd = SendCommand {
                template,
                subject,
                from,
                to,
                cc,
                bcc,
                text_only,
                vars,
                host: request.host,
                secure: request.secure,
            };
            cmd.execute(settings).await?;
        }
        Commands::Markdown {
            file,
            subject,
            from,
            to,
        } => {
            let cmd = MarkdownCommand {
                file,
                subject,
                from,
                to,
            };
            cmd.execute(settings).await?;
        }
    }

    Ok(())
}
