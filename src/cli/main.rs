use clap::{Parser, Subcommand};
use reqwest::{Client, RequestBuilder};
use serde_json::json;
use std::error::Error;

#[derive(Parser)]
#[command(name = "forum-search-cli")]
#[command(about = "Forum search CLI", long_about = None)]
struct Cli {
    #[arg(short, long, env = "FORUM_SEARCH_ENDPOINT", default_value = "http://localhost:8080")]
    endpoint: String,

    /// Act as this user on history and saved-search commands
    #[arg(short, long, env = "FORUM_SEARCH_USER_ID", global = true)]
    user: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the forum
    Search {
        #[arg(value_name = "QUERY")]
        query: String,

        #[arg(short = 't', long, default_value = "all")]
        content_type: String,

        #[arg(short, long, default_value = "relevance")]
        sort_by: String,

        #[arg(short, long, default_value = "20")]
        limit: u32,

        #[arg(short, long, default_value = "0")]
        offset: u32,

        #[arg(short, long)]
        author: Option<String>,

        #[arg(short, long)]
        category: Option<String>,

        #[arg(long)]
        date_from: Option<String>,

        #[arg(long)]
        date_to: Option<String>,

        #[arg(long)]
        highlight: bool,
    },

    /// Autocomplete suggestions
    Suggest {
        #[arg(value_name = "PREFIX")]
        q: String,

        #[arg(short, long, default_value = "10")]
        limit: u32,
    },

    /// Search analytics summary
    Analytics {
        #[arg(short, long, default_value = "7")]
        days: u32,
    },

    /// Report a click on a search result
    Click {
        #[arg(value_name = "SEARCH_ID")]
        search_id: String,

        #[arg(short, long)]
        position: u32,

        #[arg(short = 't', long)]
        result_type: String,

        #[arg(long)]
        time_to_click_ms: Option<u64>,
    },

    /// Recent searches of the user
    History {
        #[arg(short, long, default_value = "10")]
        limit: u32,

        /// Delete the user's history instead of listing it
        #[arg(long)]
        clear: bool,
    },

    /// Most frequent searches across users
    Popular {
        #[arg(short, long, default_value = "10")]
        limit: u32,
    },

    /// Manage saved searches
    Saved {
        #[command(subcommand)]
        action: SavedAction,
    },

    /// Cache hit/miss statistics
    CacheStats,

    /// Check server health
    Health,
}

#[derive(Subcommand)]
enum SavedAction {
    List,

    Add {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        query: String,

        #[arg(short = 't', long)]
        content_type: Option<String>,

        #[arg(short, long)]
        sort_by: Option<String>,
    },

    Delete {
        #[arg(value_name = "SAVED_SEARCH_ID")]
        id: String,
    },

    Use {
        #[arg(value_name = "SAVED_SEARCH_ID")]
        id: String,
    },
}

fn as_user(request: RequestBuilder, user: Option<u64>) -> RequestBuilder {
    match user {
        Some(id) => request.header("x-user-id", id.to_string()),
        None => request,
    }
}

async fn print_response(request: RequestBuilder) -> Result<(), Box<dyn Error>> {
    let response = request.send().await?;
    let status = response.status();
    if status == reqwest::StatusCode::NO_CONTENT {
        println!("{}", status);
        return Ok(());
    }

    let body: serde_json::Value = response.json().await?;
    println!("{}", serde_json::to_string_pretty(&body)?);
    if !status.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let client = Client::new();
    let endpoint = cli.endpoint.trim_end_matches('/').to_string();

    let request = match cli.command {
        Commands::Search {
            query,
            content_type,
            sort_by,
            limit,
            offset,
            author,
            category,
            date_from,
            date_to,
            highlight,
        } => as_user(
            client.post(format!("{}/api/search", endpoint)).json(&json!({
                "query": query,
                "content_type": content_type,
                "sort_by": sort_by,
                "limit": limit,
                "offset": offset,
                "author": author,
                "category": category,
                "date_from": date_from,
                "date_to": date_to,
                "highlight": highlight,
            })),
            cli.user,
        ),

        Commands::Suggest { q, limit } => client
            .get(format!("{}/api/search/suggestions", endpoint))
            .query(&[("q", q), ("limit", limit.to_string())]),

        Commands::Analytics { days } => client
            .get(format!("{}/api/search/analytics", endpoint))
            .query(&[("days", days)]),

        Commands::Click {
            search_id,
            position,
            result_type,
            time_to_click_ms,
        } => client.post(format!("{}/api/search/click", endpoint)).json(&json!({
            "search_id": search_id,
            "position": position,
            "result_type": result_type,
            "time_to_click_ms": time_to_click_ms,
        })),

        Commands::History { limit, clear } => {
            let url = format!("{}/api/search/history", endpoint);
            let request = if clear {
                client.delete(url)
            } else {
                client.get(url).query(&[("limit", limit)])
            };
            as_user(request, cli.user)
        }

        Commands::Popular { limit } => client
            .get(format!("{}/api/search/popular", endpoint))
            .query(&[("limit", limit)]),

        Commands::Saved { action } => {
            let base = format!("{}/api/search/saved", endpoint);
            let request = match action {
                SavedAction::List => client.get(base),
                SavedAction::Add {
                    name,
                    query,
                    content_type,
                    sort_by,
                } => client.post(base).json(&json!({
                    "name": name,
                    "query": query,
                    "content_type": content_type,
                    "sort_by": sort_by,
                })),
                SavedAction::Delete { id } => client.delete(format!("{}/{}", base, id)),
                SavedAction::Use { id } => client.post(format!("{}/{}/use", base, id)),
            };
            as_user(request, cli.user)
        }

        Commands::CacheStats => client.get(format!("{}/api/search/cache-stats", endpoint)),

        Commands::Health => client.get(format!("{}/health", endpoint)),
    };

    print_response(request).await
}
