use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Block, BorderType, Borders},
    Frame,
};
use tui_textarea::TextArea;

/// Single-line keyword input built on tui-textarea
pub struct InputWidget {
    textarea: TextArea<'static>,
}

impl InputWidget {
    /// Create a new input widget
    pub fn new() -> Self {
        let mut textarea = TextArea::default();
        textarea.set_block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title(Span::styled(
                    " 🔍 Search GitHub Repositories ",
                    Style::default()
                        .fg(Color::LightBlue)
                        .add_modifier(Modifier::BOLD),
                ))
                .border_style(Style::default().fg(Color::DarkGray)),
        );
        textarea.set_placeholder_text("Repository name");
        textarea.set_cursor_line_style(Style::default());

        Self { textarea }
    }

    /// Handle keyboard input. Returns whether the text changed.
    ///
    /// Line breaks are never inserted; the keyword stays on one line.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let is_newline = key.code == KeyCode::Enter
            || (key.modifiers.contains(KeyModifiers::CONTROL)
                && matches!(key.code, KeyCode::Char('m') | KeyCode::Char('j')));
        if is_newline {
            return false;
        }

        let before = self.text();
        self.textarea.input(key);
        self.text() != before
    }

    /// Current keyword
    pub fn text(&self) -> String {
        self.textarea.lines().first().cloned().unwrap_or_default()
    }

    /// Render the input widget
    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(&self.textarea, area);
    }
}

impl Default for InputWidget {
    fn default() -> Self {
        Self::new()
    }
}
