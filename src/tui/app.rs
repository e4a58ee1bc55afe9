use crate::config::SearchConfig;
use crate::event::{Event, EventResult};
use crate::search::{
    Debouncer, FetchTicket, PageSelection, PageWindow, Paginator, RepositoryItem, RepositorySearch,
    SearchCoordinator, SearchError, SearchPage, SearchPhase, TicketId,
};
use crate::tui::{pagination, InputWidget, ResultList};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Result of a fetch task, tagged with the ticket that started it
#[derive(Debug)]
pub struct FetchOutcome {
    pub ticket: TicketId,
    pub result: Result<SearchPage, SearchError>,
}

type UrlOpener = Box<dyn Fn(&str) -> anyhow::Result<()> + Send>;

/// Main application state
pub struct App {
    /// Search backend shared with fetch tasks
    client: Arc<dyn RepositorySearch>,
    coordinator: SearchCoordinator,
    debouncer: Debouncer<String>,
    window: PageWindow,
    /// Keyword input
    pub input: InputWidget,
    results: ResultList,
    should_quit: bool,
    outcome_tx: mpsc::UnboundedSender<FetchOutcome>,
    outcome_rx: mpsc::UnboundedReceiver<FetchOutcome>,
    /// One-off status text (e.g. a failed browser launch)
    notice: Option<String>,
    authenticated: bool,
    open_url: UrlOpener,
}

impl App {
    /// Create a new application instance
    pub fn new(client: Arc<dyn RepositorySearch>, search: &SearchConfig, authenticated: bool) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();

        Self {
            client,
            coordinator: SearchCoordinator::new(search.per_page()),
            debouncer: Debouncer::new(String::new(), search.debounce_delay()),
            window: PageWindow::new(search.page_range, search.margin_pages),
            input: InputWidget::new(),
            results: ResultList::new(),
            should_quit: false,
            outcome_tx,
            outcome_rx,
            notice: None,
            authenticated,
            open_url: Box::new(crate::browser::open_url),
        }
    }

    /// Replace the browser launcher
    pub fn with_url_opener<F>(mut self, open_url: F) -> Self
    where
        F: Fn(&str) -> anyhow::Result<()> + Send + 'static,
    {
        self.open_url = Box::new(open_url);
        self
    }

    /// Check if the application should quit
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn coordinator(&self) -> &SearchCoordinator {
        &self.coordinator
    }

    pub fn results(&self) -> &ResultList {
        &self.results
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    fn items(&self) -> &[RepositoryItem] {
        self.coordinator.result().map_or(&[][..], |r| r.items.as_slice())
    }

    /// Pagination control for the current result, if there is one to page through
    pub fn paginator(&self) -> Option<Paginator> {
        let result = self.coordinator.current_result()?;
        if result.is_empty() {
            return None;
        }
        Some(Paginator::new(
            self.window,
            self.coordinator.page_count(),
            self.coordinator.current_page_index(),
        ))
    }

    /// Wait for the next finished fetch
    pub async fn next_outcome(&mut self) -> Option<FetchOutcome> {
        self.outcome_rx.recv().await
    }

    /// Finished fetch, if one is already waiting
    pub fn try_next_outcome(&mut self) -> Option<FetchOutcome> {
        self.outcome_rx.try_recv().ok()
    }

    /// Apply a finished fetch; stale ones are dropped by the coordinator
    pub fn handle_outcome(&mut self, outcome: FetchOutcome) {
        if self.coordinator.complete(outcome.ticket, outcome.result) {
            let len = self.items().len();
            self.results.clamp(len);
        }
    }

    /// Handle an event
    pub fn handle_event(&mut self, event: Event) -> EventResult<()> {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Tick => {
                self.on_tick();
                Ok(())
            }
            Event::Quit => {
                self.quit();
                Ok(())
            }
            Event::Resize(..) => Ok(()),
        }
    }

    /// Settle the debounced keyword and drain finished fetches
    fn on_tick(&mut self) {
        if let Some(keyword) = self.debouncer.poll() {
            self.results.scroll_to_top();
            if let Some(ticket) = self.coordinator.keyword_settled(&keyword) {
                self.dispatch(ticket);
            }
        }

        while let Some(outcome) = self.try_next_outcome() {
            self.handle_outcome(outcome);
        }
    }

    /// Handle mouse events
    fn handle_mouse(&mut self, mouse: MouseEvent) -> EventResult<()> {
        match mouse.kind {
            MouseEventKind::ScrollUp => self.select_previous_result(),
            MouseEventKind::ScrollDown => self.select_next_result(),
            _ => {}
        }
        Ok(())
    }

    /// Handle keyboard input
    fn handle_key(&mut self, key: KeyEvent) -> EventResult<()> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Char('c') if ctrl => self.quit(),
            KeyCode::Esc => self.quit(),
            KeyCode::Char('r') if ctrl => self.reset(),
            KeyCode::Up => self.select_previous_result(),
            KeyCode::Down => self.select_next_result(),
            KeyCode::PageUp => self.page_with(Paginator::previous),
            KeyCode::PageDown => self.page_with(Paginator::next),
            KeyCode::Home if ctrl => self.page_with(Paginator::first),
            KeyCode::End if ctrl => self.page_with(Paginator::last),
            KeyCode::Enter => self.open_selected(),
            _ => {
                if self.input.handle_key(key) {
                    self.notice = None;
                    self.debouncer.update(self.input.text());
                }
            }
        }
        Ok(())
    }

    /// Stop the loop; a keyword still waiting on the debounce is dropped
    fn quit(&mut self) {
        self.debouncer.cancel();
        self.should_quit = true;
    }

    fn select_previous_result(&mut self) {
        let items = self.coordinator.result().map_or(&[][..], |r| r.items.as_slice());
        self.results.select_previous(items);
    }

    fn select_next_result(&mut self) {
        let items = self.coordinator.result().map_or(&[][..], |r| r.items.as_slice());
        self.results.select_next(items);
    }

    fn page_with(&mut self, pick: fn(&Paginator) -> Option<PageSelection>) {
        if let Some(selection) = self.paginator().as_ref().and_then(pick) {
            self.select_page(selection);
        }
    }

    /// Page link selected: scroll to the top and fetch that page
    pub fn select_page(&mut self, selection: PageSelection) {
        self.results.scroll_to_top();
        if let Some(ticket) = self.coordinator.select_page(selection) {
            self.dispatch(ticket);
        }
    }

    /// "Back to page 1"
    pub fn reset(&mut self) {
        if self.coordinator.phase() != SearchPhase::Error {
            return;
        }
        self.results.scroll_to_top();
        if let Some(ticket) = self.coordinator.reset() {
            self.dispatch(ticket);
        }
    }

    fn open_selected(&mut self) {
        let Some(url) = self
            .results
            .selected_item(self.items())
            .map(|item| item.html_url.clone())
        else {
            return;
        };

        self.notice = match (self.open_url)(&url) {
            Ok(()) => Some(format!("Opened {url}")),
            Err(e) => {
                tracing::warn!(error = %e, url = %url, "failed to open browser");
                Some(format!("Could not open browser: {e}"))
            }
        };
    }

    /// Run the ticket's fetch on the runtime and report back over the channel
    fn dispatch(&self, ticket: FetchTicket) {
        let client = Arc::clone(&self.client);
        let tx = self.outcome_tx.clone();

        tokio::spawn(async move {
            let result = client.search(&ticket.params, ticket.per_page).await;
            // Receiver gone means the app is shutting down.
            let _ = tx.send(FetchOutcome {
                ticket: ticket.id,
                result,
            });
        });
    }

    /// Render the application UI
    pub fn render(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Keyword input
                Constraint::Length(1), // Status line
                Constraint::Min(3),    // Results
                Constraint::Length(1), // Pagination
                Constraint::Length(1), // Key help
            ])
            .split(frame.area());

        self.input.render(frame, chunks[0]);
        self.render_status(frame, chunks[1]);
        self.render_results(frame, chunks[2]);
        if let Some(paginator) = self.paginator() {
            pagination::render(frame, chunks[3], &paginator);
        }
        self.render_help(frame, chunks[4]);
    }

    /// Render status line
    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let line = if self.coordinator.is_loading() {
            Line::from(Span::styled("Loading...", Style::default().fg(Color::Yellow)))
        } else if let Some(notice) = &self.notice {
            Line::from(Span::styled(notice.clone(), Style::default().fg(Color::Cyan)))
        } else if let Some(result) = self.coordinator.result().filter(|r| !r.is_empty()) {
            Line::from(vec![
                Span::styled("Search Result: ", Style::default().fg(Color::Yellow)),
                Span::raw(format!("{} repositories", result.total_count)),
            ])
        } else if !self.authenticated {
            Line::from(Span::styled(
                "No GitHub token configured: using the unauthenticated rate limit",
                Style::default().fg(Color::DarkGray),
            ))
        } else {
            Line::default()
        };

        frame.render_widget(Paragraph::new(line), area);
    }

    /// Render results, the error message, or an empty-state hint
    fn render_results(&mut self, frame: &mut Frame, area: Rect) {
        if let Some(message) = self.coordinator.error_message() {
            let text = vec![
                Line::from(Span::styled(
                    message.to_string(),
                    Style::default().fg(Color::LightRed),
                )),
                Line::default(),
                Line::from(Span::styled(
                    "[ Ctrl+R: Back to Page 1 ]",
                    Style::default()
                        .fg(Color::LightBlue)
                        .add_modifier(Modifier::BOLD),
                )),
            ];
            frame.render_widget(Paragraph::new(text).wrap(Wrap { trim: false }), area);
            return;
        }

        let items = self
            .coordinator
            .result()
            .map_or(&[][..], |r| r.items.as_slice());
        if items.is_empty() {
            if self.coordinator.phase() == SearchPhase::Success {
                let empty = Paragraph::new("No repositories found.")
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(Color::DarkGray));
                frame.render_widget(empty, area);
            }
            return;
        }

        self.results.render(frame, area, items);
    }

    fn render_help(&self, frame: &mut Frame, area: Rect) {
        let help = Line::from(Span::styled(
            "↑↓ select │ Enter open │ PgUp/PgDn page │ Ctrl+Home/End first/last │ Esc quit",
            Style::default().fg(Color::DarkGray),
        ));
        frame.render_widget(Paragraph::new(help), area);
    }
}
