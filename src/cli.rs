//! Command-line argument parsing for lakeq.
//!
//! One subcommand per exposed operation, plus `step` for workflow re-invocation.

use clap::{Parser, Subcommand};
use lakeq::config::Config;
use std::path::PathBuf;

/// Run SQL against a remote data-lake query engine.
#[derive(Parser, Debug)]
#[command(name = "lakeq")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Use the in-memory engine and workflow engine (for testing)
    #[arg(long, global = true)]
    pub mock_engine: bool,

    /// Write logs to the lakeq log file instead of stderr
    #[arg(long, global = true)]
    pub log_file: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Run a query to completion and print its first page (ExecuteQuery)
    Query {
        /// Database to run against
        #[arg(short = 'd', long, env = "LAKEQ_DATABASE")]
        database: String,

        /// SQL text
        sql: String,
    },

    /// Submit a query and report its status after a short wait (ExecuteAsyncQuery)
    Submit {
        /// Database to run against
        #[arg(short = 'd', long, env = "LAKEQ_DATABASE")]
        database: String,

        /// Upper bound on rows returned inline
        #[arg(long, value_name = "N")]
        max_page_size: Option<usize>,

        /// SQL text
        sql: String,
    },

    /// Print the status of a query (GetQueryStatus)
    Status {
        /// Query id returned by `submit`
        query_id: String,
    },

    /// Fetch a page of results (GetQueryResults)
    Results {
        /// Query id returned by `submit`
        query_id: String,

        /// Continuation token from a previous page
        #[arg(long, value_name = "TOKEN", conflicts_with = "all")]
        token: Option<String>,

        /// Upper bound on rows per page
        #[arg(long, value_name = "N")]
        max_page_size: Option<usize>,

        /// Follow continuation tokens until every page is fetched
        #[arg(long)]
        all: bool,
    },

    /// Hand the query to the workflow engine (ExecuteAsyncQueryNotify)
    Notify {
        /// Database to run against
        #[arg(short = 'd', long, env = "LAKEQ_DATABASE")]
        database: String,

        /// Upper bound on rows returned by the workflow's kickoff step
        #[arg(long, value_name = "N")]
        max_page_size: Option<usize>,

        /// SQL text
        sql: String,
    },

    /// Advance a workflow state read from stdin by one step
    Step,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path to use.
    ///
    /// Uses the --config argument if provided, otherwise the default path.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }
}
