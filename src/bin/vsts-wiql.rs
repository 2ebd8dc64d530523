use anyhow::Result;
use clap::{CommandFactory, Parser};
use std::io::{self, Write};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use vsts_wiql::{
    Config, ResolvedConfig, VstsClient, WorkItemsQuery, WorkItemsQueryResult,
    cli::{Args, Commands, ShapeArg},
    logging::{init_logging, parse_early_log_config},
    models::{FlatWorkItemsQueryResult, HierarchicalWorkItemsQueryResult},
    output::write_result,
};

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let raw_args: Vec<String> = std::env::args().collect();
    let _log_guard = init_logging(parse_early_log_config(&raw_args))?;

    let args = Args::parse();

    // Handle --create-config flag
    if args.create_config {
        let path = Config::create_sample_config()?;
        println!("Sample config at: {}", path.display());
        return Ok(());
    }

    let Some(command) = args.command.clone() else {
        Args::command().print_help()?;
        return Ok(());
    };

    let config = args.merged_config(Config::load_from_file()?).resolve()?;
    debug!(
        instance = config.instance.as_ref().map(|i| i.value().as_str()),
        base_url = config.base_url.as_ref().map(|u| u.value().as_str()),
        "Configuration resolved"
    );

    let client = || VstsClient::from_config(&config);

    // Ctrl-C aborts the in-flight request.
    let token = CancellationToken::new();
    let ctrl_c_token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, cancelling request");
            ctrl_c_token.cancel();
        }
    });

    let result: WorkItemsQueryResult = match command {
        Commands::Config => return print_config(&config),
        Commands::Query { text, hierarchical } => {
            let query = WorkItemsQuery::get(text, hierarchical);
            client()?.execute_query(Some(&query), &token).await?
        }
        Commands::Stored { id, shape } => match shape {
            ShapeArg::Auto => client()?.execute_stored_query(id, &token).await?,
            ShapeArg::Flat => client()?
                .execute_stored_query::<FlatWorkItemsQueryResult>(id, &token)
                .await?
                .into(),
            ShapeArg::Hierarchical => client()?
                .execute_stored_query::<HierarchicalWorkItemsQueryResult>(id, &token)
                .await?
                .into(),
        },
    };

    let mut stdout = io::stdout().lock();
    write_result(&mut stdout, &result, args.output)?;
    stdout.flush()?;
    Ok(())
}

fn print_config(config: &ResolvedConfig) -> Result<()> {
    let mut stdout = io::stdout().lock();
    match &config.instance {
        Some(instance) => writeln!(
            stdout,
            "instance:             {} [{}]",
            instance,
            instance.source_description()
        )?,
        None => writeln!(stdout, "instance:             (not set)")?,
    }
    writeln!(
        stdout,
        "pat:                  [REDACTED] [{}]",
        config.pat.source_description()
    )?;
    match &config.base_url {
        Some(base_url) => writeln!(
            stdout,
            "base_url:             {} [{}]",
            base_url,
            base_url.source_description()
        )?,
        None => writeln!(stdout, "base_url:             (derived from instance)")?,
    }
    writeln!(
        stdout,
        "request_timeout_secs: {} [{}]",
        config.request_timeout_secs,
        config.request_timeout_secs.source_description()
    )?;
    Ok(())
}
