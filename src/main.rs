//! squ - run SQL against MySQL from the command line.

mod cli;
mod output;

use cli::{Cli, Command};
use squ::logging::init_stderr_logging;
use squ::{Result, Squ, SquConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();
    init_stderr_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        error!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    info!("Loading connection parameters from: {}", cli.env.display());
    let mut config = SquConfig::load(&cli.env)?.with_verbose(cli.verbose);
    if let Some(dir) = cli.sql_dir {
        config = config.with_sql_dir(dir);
    }
    if let Some(partitions) = cli.partitions {
        config = config.with_partitions(partitions);
    }
    info!("Connection: {}", config.params().display_string());

    let squ = Squ::new(config);

    match cli.command {
        Command::Query {
            backend,
            source,
            format,
        } => {
            let result = squ.query(&source.to_source(), backend).await?;
            println!("{}", output::render(&result, format)?);
        }
        Command::CreateView { name, source } => {
            squ.create_view(&name, &source.to_source()).await?;
            println!("View '{name}' created.");
        }
        Command::DropView { name } => {
            squ.drop_view(&name).await?;
            println!("View '{name}' dropped.");
        }
        Command::Exec { source } => {
            let affected = squ.execute(&source.to_source()).await?;
            println!("{}", output::affected_rows(affected));
        }
    }

    Ok(())
}
