use crate::config::{self, Config};
use crate::event::Event;
use crate::search::providers::GithubSearchClient;
use crate::search::{RepositorySearch, SearchError, SearchParams};
use crate::tui::App;
use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, EventStream},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::Stdout;
use std::sync::Arc;
use std::time::Duration;

/// UI refresh and debounce polling interval
const TICK_RATE: Duration = Duration::from_millis(50);

#[derive(Debug, Parser)]
#[command(name = "ghsearch")]
#[command(version, about = "Search GitHub repositories from the terminal")]
pub struct Cli {
    /// Run a single search, print the results and exit
    #[arg(long, short)]
    pub query: Option<String>,

    /// Page to fetch with --query (1-based)
    #[arg(long, default_value_t = 1, requires = "query")]
    pub page: u32,

    /// Results per page
    #[arg(long)]
    pub per_page: Option<u32>,

    /// Quiet period in milliseconds before a typed keyword is searched
    #[arg(long)]
    pub debounce_ms: Option<u64>,

    /// GitHub access token (overrides GITHUB_TOKEN and the config file)
    #[arg(long)]
    pub token: Option<String>,

    /// GitHub API base URL (for GitHub Enterprise)
    #[arg(long)]
    pub api_base: Option<String>,

    /// Write debug logs to the configured log file
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Layer command line flags over the loaded configuration
    pub fn apply(&self, config: &mut Config) {
        if let Some(per_page) = self.per_page {
            config.search.per_page = per_page;
        }
        if let Some(debounce_ms) = self.debounce_ms {
            config.search.debounce_ms = debounce_ms;
        }
        if let Some(token) = &self.token {
            config.github.token = Some(token.clone());
        }
        if let Some(api_base) = &self.api_base {
            config.github.api_base = api_base.clone();
        }
        if self.debug {
            config.debug = true;
        }
    }
}

/// Parse arguments, load configuration and run either mode
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = config::load_or_create_config()?;
    cli.apply(&mut config);

    let _log_guard = crate::logging::init(&config)?;
    tracing::info!(
        api_base = %config.github.api_base,
        per_page = config.search.per_page(),
        debounce_ms = config.search.debounce_ms,
        authenticated = config.github.token().is_some(),
        "starting ghsearch"
    );

    let client = GithubSearchClient::new(config.github.clone());
    let authenticated = client.is_authenticated();
    let client: Arc<dyn RepositorySearch> = Arc::new(client);

    match cli.query {
        Some(keyword) => {
            let params = SearchParams::new(keyword, cli.page);
            run_once(client.as_ref(), &params, config.search.per_page()).await
        }
        None => run_tui(client, &config, authenticated).await,
    }
}

/// One search, printed as plain text
pub async fn run_once(client: &dyn RepositorySearch, params: &SearchParams, per_page: u32) -> Result<()> {
    match client.search(params, per_page).await {
        Ok(page) => {
            print!("{}", crate::output::format_page(params, per_page, &page));
            Ok(())
        }
        Err(SearchError::EmptyQuery) => anyhow::bail!("Search keyword is empty"),
        Err(e) => Err(e).context("Repository search failed"),
    }
}

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Restores the terminal even when the UI loop bails out early
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<(Self, Tui)> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        let guard = TerminalGuard;

        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
            .context("Failed to enter alternate screen")?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout)).context("Failed to create terminal")?;

        Ok((guard, terminal))
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(std::io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
    }
}

async fn run_tui(client: Arc<dyn RepositorySearch>, config: &Config, authenticated: bool) -> Result<()> {
    let (_guard, mut terminal) = TerminalGuard::enter()?;
    let mut app = App::new(client, &config.search, authenticated);

    let mut events = EventStream::new();
    let mut ticker = tokio::time::interval(TICK_RATE);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    while !app.should_quit() {
        terminal.draw(|frame| app.render(frame))?;

        tokio::select! {
            maybe_event = events.next() => match maybe_event {
                Some(Ok(raw)) => {
                    if let Some(event) = Event::from_terminal(raw) {
                        app.handle_event(event)?;
                    }
                }
                Some(Err(e)) => return Err(e).context("Failed to read terminal event"),
                None => app.handle_event(Event::Quit)?,
            },
            Some(outcome) = app.next_outcome() => app.handle_outcome(outcome),
            _ = ticker.tick() => app.handle_event(Event::Tick)?,
        }
    }

    terminal.show_cursor().ok();
    tracing::info!("exiting");
    Ok(())
}
