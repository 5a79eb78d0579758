//! `tapestry` — Tapestry platform command-line interface.
//!
//! Provides subcommands for the everyday platform operations:
//!
//! - **`auth`** — authenticate and print the session ticket.
//! - **`get`** — fetch an individual by URI and print its JSON.
//! - **`query`** — run a full-text query and print matching URIs.
//! - **`put`** — store an individual read from a JSON file or stdin (`-`).
//! - **`remove`** — delete an individual by URI.
//!
//! The API base URL comes from `--url` or `TAPESTRY_URL`; an existing
//! session ticket can be supplied with `--ticket` or `TAPESTRY_TICKET`
//! (as printed by `tapestry auth`).

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tapestry_client::{util, QueryRequest, TapestryClient, UpdateOptions};
use tapestry_model::Individual;

/// tapestry — Tapestry platform CLI
///
/// Authenticate against a platform instance and read, query, store, or
/// delete individuals.
#[derive(Parser)]
#[command(name = "tapestry", version, about, long_about = None)]
struct Cli {
    /// Base URL of the platform API, e.g. http://platform.example.com/api
    #[arg(long, env = "TAPESTRY_URL")]
    url: String,

    /// Session ticket from a previous `tapestry auth`.
    #[arg(long, env = "TAPESTRY_TICKET")]
    ticket: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Authenticate and print the session response as JSON.
    ///
    /// The password is hashed locally before it is sent; export the
    /// returned `id` as TAPESTRY_TICKET for subsequent commands.
    Auth {
        /// Login name.
        #[arg(short, long)]
        login: String,

        /// Plain-text password (hashed client-side).
        #[arg(short, long)]
        password: String,

        /// Optional secret for additional verification.
        #[arg(long)]
        secret: Option<String>,
    },

    /// Fetch one individual and print its wire JSON.
    Get {
        /// URI of the individual, e.g. td:RomanKarpov.
        uri: String,
    },

    /// Run a full-text query and print the matching URIs, one per line.
    ///
    /// Example:
    ///   tapestry query "'rdf:type'=='v-s:Document'" --top 20
    Query {
        /// The query string.
        query: String,

        /// Sort expression, e.g. "'v-s:created' desc".
        #[arg(long)]
        sort: Option<String>,

        /// Maximum number of results.
        #[arg(long)]
        top: Option<i64>,

        /// Result offset for paging.
        #[arg(long)]
        from: Option<i64>,

        /// Server-side evaluation limit.
        #[arg(long)]
        limit: Option<i64>,
    },

    /// Store an individual read from a JSON file, or stdin when FILE is `-`.
    Put {
        /// Path to a JSON file in the wire shape, or `-` for stdin.
        file: PathBuf,
    },

    /// Delete an individual by URI.
    Remove {
        /// URI of the individual to delete.
        uri: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tapestry_client=warn".into()),
        )
        .init();

    let cli = Cli::parse();

    let mut client = TapestryClient::new(&cli.url);
    if let Some(ticket) = &cli.ticket {
        client.set_session(ticket.clone(), None);
    }

    match cli.command {
        Command::Auth {
            login,
            password,
            secret,
        } => {
            let auth = client
                .authenticate(&login, &util::hash_password(&password), secret.as_deref())
                .await
                .unwrap_or_else(|e| fatal(&format!("authentication failed: {e}")));
            println!("{}", serde_json::to_string_pretty(&auth).unwrap());
        }

        Command::Get { uri } => {
            let individual = client
                .get_individual(&uri, None)
                .await
                .unwrap_or_else(|e| fatal(&format!("failed to fetch {uri}: {e}")));
            println!("{}", serde_json::to_string_pretty(&individual).unwrap());
        }

        Command::Query {
            query,
            sort,
            top,
            from,
            limit,
        } => {
            let request = QueryRequest {
                query,
                sort,
                top,
                from,
                limit,
                ..Default::default()
            };
            let page = client
                .query(&request)
                .await
                .unwrap_or_else(|e| fatal(&format!("query failed: {e}")));
            for uri in &page.result {
                println!("{uri}");
            }
            eprintln!(
                "{} of ~{} matches (cursor {})",
                page.count, page.estimated, page.cursor
            );
        }

        Command::Put { file } => {
            let json = read_input(&file);
            let individual: Individual = serde_json::from_str(&json)
                .unwrap_or_else(|e| fatal(&format!("failed to parse input: {e}")));
            if individual.uri.is_empty() {
                fatal("input has no \"@\" uri — refusing to store an unnamed individual");
            }
            let op = client
                .put_individual(&individual, &UpdateOptions::default())
                .await
                .unwrap_or_else(|e| fatal(&format!("put failed: {e}")));
            println!("op_id {} result {}", op.op_id, op.result);
        }

        Command::Remove { uri } => {
            let op = client
                .remove_individual(&uri, &UpdateOptions::default())
                .await
                .unwrap_or_else(|e| fatal(&format!("remove failed: {e}")));
            println!("op_id {} result {}", op.op_id, op.result);
        }
    }
}

/// Read the full contents of a file, or stdin when the path is `"-"`.
fn read_input(path: &PathBuf) -> String {
    if path.to_str() == Some("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .unwrap_or_else(|e| fatal(&format!("failed to read stdin: {e}")));
        buf
    } else {
        fs::read_to_string(path)
            .unwrap_or_else(|e| fatal(&format!("failed to read {}: {e}", path.display())))
    }
}

/// Print an error message to stderr and exit with code 2.
fn fatal(msg: &str) -> ! {
    eprintln!("tapestry: {}", msg);
    process::exit(2);
}
