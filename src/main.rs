#![allow(clippy::uninlined_format_args)]

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use tracing::info;

use pinprobe::api::{ApiClientConfig, ApiResponse, JsonPlaceholderApi, PinterestApi};
use pinprobe::artifacts::Outcome;
use pinprobe::config::{BrowserType, Environment, Settings};
use pinprobe::context::RunContext;
use pinprobe::errors::{ProbeError, ProbeResult};
use pinprobe::flows;
use pinprobe::logging;
use pinprobe::webdriver::WebDriverPage;

const EXIT_SUCCESS: i32 = 0;

#[derive(Parser)]
#[command(name = "pinprobe")]
#[command(about = "End-to-end probe for Pinterest search, downloads and API calls", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Target environment (overrides TEST_ENV)
    #[arg(long, global = true)]
    env: Option<Environment>,

    /// Browser to drive (overrides BROWSER)
    #[arg(short, long, global = true)]
    browser: Option<BrowserType>,

    /// Run the browser headless (overrides HEADLESS)
    #[arg(long, global = true)]
    headless: bool,

    /// Read settings from this dotenv file instead of ./.env
    #[arg(long, global = true, value_name = "PATH")]
    env_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for a keyword and verify that pins load
    Search {
        /// Search keyword
        keyword: String,
    },

    /// Search for a keyword and download full-size images
    Download {
        /// Search keyword
        keyword: String,

        /// Number of images to download
        #[arg(short, long, default_value = "5")]
        count: usize,
    },

    /// Call an API endpoint and print the normalized response
    Api {
        #[command(subcommand)]
        action: ApiCommands,

        /// Override the API base URL (e.g. a local mock server)
        #[arg(long, global = true)]
        base_url: Option<String>,
    },

    /// Print the resolved configuration
    Config,
}

#[derive(Subcommand)]
enum ApiCommands {
    #[command(flatten)]
    Placeholder(PlaceholderCommands),
    #[command(flatten)]
    Pinterest(PinterestCommands),
}

/// JSONPlaceholder endpoints
#[derive(Subcommand)]
enum PlaceholderCommands {
    /// GET /posts
    Posts,
    /// GET /posts/{id}
    Post { id: u32 },
    /// POST /posts
    CreatePost {
        title: String,
        body: String,
        #[arg(long, default_value = "1")]
        user_id: u32,
    },
    /// DELETE /posts/{id}
    DeletePost { id: u32 },
    /// GET /posts/{id}/comments
    Comments { id: u32 },
    /// GET /users/{id}
    User { id: u32 },
    /// GET /users/{id}/posts
    UserPosts { id: u32 },
}

/// Pinterest endpoints
#[derive(Subcommand)]
enum PinterestCommands {
    /// GET /search/pins/?q=
    SearchPins { keyword: String },
    /// GET /users/{username}/
    Profile { username: String },
}

#[tokio::main]
async fn main() {
    let result = run().await;

    match result {
        Ok(()) => std::process::exit(EXIT_SUCCESS),
        Err(err) => {
            let probe_err = ProbeError::classify(err);

            // Output JSON error to stdout for programmatic consumption
            let error_json = json!({
                "error": true,
                "message": probe_err.to_string(),
                "exit_code": probe_err.exit_code()
            });
            println!(
                "{}",
                serde_json::to_string(&error_json).unwrap_or_else(|_| "{}".to_string())
            );

            eprintln!("Error: {}", probe_err);
            std::process::exit(probe_err.exit_code());
        }
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = match &cli.env_file {
        Some(path) => Settings::from_env_file(path, |key| std::env::var(key).ok())?,
        None => Settings::from_env(),
    };
    if let Some(env) = cli.env {
        settings.set_environment(env);
    }
    if let Some(browser) = cli.browser {
        settings.set_browser(browser);
    }
    if cli.headless {
        settings.browser.headless = true;
    }

    if let Commands::Config = cli.command {
        return print_json(&settings);
    }

    logging::init(&settings.logs_dir())?;
    info!("Session starting | Env: {:?}", settings.environment);
    let ctx = RunContext::new(settings);

    match cli.command {
        Commands::Search { keyword } => {
            let page = WebDriverPage::connect(&ctx.settings).await?;
            let result = flows::search(&page, &ctx, &keyword).await;
            finish_scenario(&page, &ctx, &format!("test_search[{}]", keyword), &result).await;
            page.close().await?;
            print_json(&result?)?;
        }

        Commands::Download { keyword, count } => {
            let api = PinterestApi::new(&ctx.settings)?;
            let page = WebDriverPage::connect(&ctx.settings).await?;
            let result = flows::download_images(&page, &ctx, &api, &keyword, count).await;
            finish_scenario(&page, &ctx, &format!("test_download[{}]", keyword), &result).await;
            page.close().await?;
            api.close();
            print_json(&result?)?;
        }

        Commands::Api { action, base_url } => {
            let response = run_api(&ctx, action, base_url.as_deref()).await?;
            print_json(&json!({
                "status_code": response.status_code(),
                "success": response.success(),
                "error_message": response.error_message(),
                "data": response.data(),
            }))?;
        }

        Commands::Config => {}
    }

    Ok(())
}

async fn run_api(ctx: &RunContext, action: ApiCommands, base_url: Option<&str>) -> Result<ApiResponse> {
    let config = ApiClientConfig::from_settings(&ctx.settings);

    let response = match action {
        ApiCommands::Pinterest(command) => {
            let base_url = base_url.unwrap_or(&ctx.settings.urls.base_api);
            let api = PinterestApi::with_base_url(base_url, config)?;
            let response = match command {
                PinterestCommands::SearchPins { keyword } => api.search_pins(&keyword).await,
                PinterestCommands::Profile { username } => api.user_profile(&username).await,
            };
            api.close();
            response
        }
        ApiCommands::Placeholder(command) => {
            let api = match base_url {
                Some(url) => JsonPlaceholderApi::with_base_url(url, config)?,
                None => JsonPlaceholderApi::new(config)?,
            };
            let response = match command {
                PlaceholderCommands::Posts => api.all_posts().await,
                PlaceholderCommands::Post { id } => api.post(id).await,
                PlaceholderCommands::CreatePost {
                    title,
                    body,
                    user_id,
                } => api.create_post(&title, &body, user_id).await,
                PlaceholderCommands::DeletePost { id } => api.delete_post(id).await,
                PlaceholderCommands::Comments { id } => api.post_comments(id).await,
                PlaceholderCommands::User { id } => api.user(id).await,
                PlaceholderCommands::UserPosts { id } => api.user_posts(id).await,
            };
            api.close();
            response
        }
    };
    Ok(response)
}

/// Outcome screenshot on failure, and video renaming when recording is on
async fn finish_scenario<T>(
    page: &WebDriverPage,
    ctx: &RunContext,
    test_name: &str,
    result: &ProbeResult<T>,
) {
    let outcome = match result {
        Ok(_) => Outcome::Passed,
        Err(_) => Outcome::Failed,
    };
    if outcome == Outcome::Failed {
        ctx.artifacts.capture_outcome(page, test_name, outcome).await;
    }
    if ctx.settings.browser.record_video {
        ctx.artifacts.finalize_videos(test_name, outcome);
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
