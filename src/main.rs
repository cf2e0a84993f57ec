//! lakeq - asynchronous SQL query execution over a remote data-lake engine.

mod cli;

use cli::{Cli, Command};
use lakeq::api::{
    DatabaseApi, ExecuteAsyncQueryInput, ExecuteAsyncQueryNotifyInput, ExecuteQueryInput,
    GetQueryResultsInput, GetQueryStatusInput,
};
use lakeq::config::Config;
use lakeq::error::{LakeqError, Result};
use lakeq::logging;
use lakeq::query::{ContinuationToken, ExecutionHandle};
use lakeq::workflow::WorkflowState;
use serde::Serialize;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Missing .env is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse_args();
    if cli.log_file {
        logging::init_file_logging();
    } else {
        logging::init_stderr_logging();
    }

    if let Err(e) = run(cli).await {
        error!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let mut config = Config::load_from_file(&config_path)?;
    config.apply_env_overrides();
    config.validate()?;

    let api = DatabaseApi::from_config(&config, cli.mock_engine)?;

    match cli.command {
        Command::Query { database, sql } => {
            let output = api
                .execute_query(ExecuteQueryInput {
                    database_name: database,
                    sql,
                })
                .await?;
            print_json(&output)
        }
        Command::Submit {
            database,
            max_page_size,
            sql,
        } => {
            let output = api
                .execute_async_query(ExecuteAsyncQueryInput {
                    database_name: database,
                    sql,
                    results_max_page_size: max_page_size,
                })
                .await?;
            print_json(&output)
        }
        Command::Status { query_id } => {
            let output = api
                .get_query_status(GetQueryStatusInput {
                    query_id: ExecutionHandle::new(query_id),
                })
                .await?;
            print_json(&output)
        }
        Command::Results {
            query_id,
            token,
            max_page_size,
            all,
        } => {
            let query_id = ExecutionHandle::new(query_id);
            let output = if all {
                api.get_all_query_results(query_id, max_page_size).await?
            } else {
                api.get_query_results(GetQueryResultsInput {
                    query_id,
                    pagination_token: token.map(ContinuationToken::new),
                    results_max_page_size: max_page_size,
                })
                .await?
            };
            print_json(&output)
        }
        Command::Notify {
            database,
            max_page_size,
            sql,
        } => {
            let output = api
                .execute_async_query_notify(ExecuteAsyncQueryNotifyInput {
                    database_name: database,
                    sql,
                    results_max_page_size: max_page_size,
                })
                .await?;
            print_json(&output)
        }
        Command::Step => {
            let input = std::io::read_to_string(std::io::stdin())
                .map_err(|e| LakeqError::internal(format!("Failed to read stdin: {e}")))?;
            let state: WorkflowState = serde_json::from_str(&input)?;
            let next = api.steps().advance(state).await?;
            print_json(&next)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
