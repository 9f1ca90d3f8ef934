//! hackerthink-admin: operator CLI over the admin list pipeline.

mod args;
mod client;
mod handlers;
mod io;
mod print;

use std::process;

use clap::Parser;
use hackerthink_admin::application::error::{AppError, error_chain};
use hackerthink_api_types::{Interview, NewsItem, Product, Tutorial};
use tracing::{Dispatch, Level, dispatcher, error};

use args::{Cli, Commands};
use client::build_ctx_from_cli;
use handlers::{categories, content, tools};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(error.exit_code());
    }
}

fn report_application_error(error: &AppError) {
    let chain = error_chain(error);
    if dispatcher::has_been_set() {
        error!(error = %error, chain = ?chain, "{}", error.presentation_message());
        return;
    }

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::ERROR)
        .with_writer(std::io::stderr)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, chain = ?chain, "{}", error.presentation_message());
    });
}

async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let ctx = build_ctx_from_cli(&cli)?;

    match cli.command {
        Commands::Interviews(cmd) => content::handle::<Interview>(&ctx, cmd.action).await?,
        Commands::News(cmd) => content::handle::<NewsItem>(&ctx, cmd.action).await?,
        Commands::Products(cmd) => content::handle::<Product>(&ctx, cmd.action).await?,
        Commands::Tutorials(cmd) => content::handle::<Tutorial>(&ctx, cmd.action).await?,
        Commands::Categories(args) => categories::handle(&ctx, args).await?,
        Commands::Tools(cmd) => tools::handle(&ctx, cmd.action).await?,
    }

    Ok(())
}
