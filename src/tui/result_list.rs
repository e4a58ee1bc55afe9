use crate::search::RepositoryItem;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};
use textwrap::wrap;
use unicode_width::UnicodeWidthStr;

/// Description lines shown per repository before eliding
const MAX_DESCRIPTION_LINES: usize = 3;
/// Blank rows between cards
const CARD_SPACING: u16 = 1;

/// Repository cards with selection and scrolling
pub struct ResultList {
    selected: usize,
    scroll_offset: u16,
    viewport_height: u16,
    viewport_width: u16,
}

impl ResultList {
    pub fn new() -> Self {
        Self {
            selected: 0,
            scroll_offset: 0,
            viewport_height: 0,
            viewport_width: 0,
        }
    }

    /// Index of the highlighted repository
    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Highlighted repository, if the list is non-empty
    pub fn selected_item<'a>(&self, items: &'a [RepositoryItem]) -> Option<&'a RepositoryItem> {
        items.get(self.selected)
    }

    pub fn select_next(&mut self, items: &[RepositoryItem]) {
        if self.selected + 1 < items.len() {
            self.selected += 1;
            self.ensure_selected_visible(items);
        }
    }

    pub fn select_previous(&mut self, items: &[RepositoryItem]) {
        if self.selected > 0 {
            self.selected -= 1;
            self.ensure_selected_visible(items);
        }
    }

    /// Back to the first card (page changes and new results)
    pub fn scroll_to_top(&mut self) {
        self.selected = 0;
        self.scroll_offset = 0;
    }

    /// Keep the selection inside a list that may have shrunk
    pub fn clamp(&mut self, len: usize) {
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    /// Calculate the height of a card when rendered
    fn card_height(item: &RepositoryItem, width: u16) -> u16 {
        let border_height = 2;
        let meta_line = 1;
        let description_lines = item
            .description
            .as_deref()
            .map(|d| wrap_description(d, content_width(width)).len())
            .unwrap_or(1);

        border_height + meta_line + description_lines as u16
    }

    /// Top row and height of every card
    fn layout(items: &[RepositoryItem], width: u16) -> Vec<(u16, u16)> {
        let mut y = 0u16;
        items
            .iter()
            .map(|item| {
                let height = Self::card_height(item, width);
                let pos = (y, height);
                y = y.saturating_add(height + CARD_SPACING);
                pos
            })
            .collect()
    }

    fn ensure_selected_visible(&mut self, items: &[RepositoryItem]) {
        if self.viewport_height == 0 {
            return;
        }
        let positions = Self::layout(items, self.viewport_width.max(1));
        let Some(&(top, height)) = positions.get(self.selected) else {
            return;
        };

        if top < self.scroll_offset {
            self.scroll_offset = top;
        } else if top + height > self.scroll_offset + self.viewport_height {
            self.scroll_offset = (top + height).saturating_sub(self.viewport_height);
        }
    }

    /// Render the cards for `items`
    pub fn render(&mut self, frame: &mut Frame, area: Rect, items: &[RepositoryItem]) {
        self.viewport_height = area.height;
        self.viewport_width = area.width;
        self.clamp(items.len());

        let visible_start = self.scroll_offset;
        let visible_end = visible_start + area.height;

        for (i, (pos, height)) in Self::layout(items, area.width).into_iter().enumerate() {
            if pos + height <= visible_start || pos >= visible_end {
                continue;
            }
            // Cards straddling the top edge are skipped rather than clipped.
            if pos < visible_start {
                continue;
            }

            let render_y = pos - visible_start;
            let card_area = Rect {
                x: area.x,
                y: area.y + render_y,
                width: area.width,
                height: height.min(area.height - render_y),
            };

            self.render_card(frame, &items[i], card_area, i == self.selected);
        }
    }

    /// Render a single repository card
    fn render_card(&self, frame: &mut Frame, item: &RepositoryItem, area: Rect, selected: bool) {
        let border_color = if selected { Color::LightCyan } else { Color::DarkGray };
        let stars = format!("★ {} ", item.stargazers_count);

        // Title: name on the left, stars on the right of the top border
        let name_room = (area.width as usize).saturating_sub(stars.width() + 6);
        let title = Line::from(vec![
            Span::raw(" "),
            Span::styled(
                truncate_to_width(item.display_name(), name_room),
                Style::default()
                    .fg(Color::LightGreen)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
        ]);

        let mut meta = vec![Span::styled(
            format!(" {} ", item.visibility),
            Style::default().fg(Color::Black).bg(Color::Gray),
        )];
        if let Some(language) = &item.language {
            meta.push(Span::raw("  "));
            meta.push(Span::styled(language.clone(), Style::default().fg(Color::Yellow)));
        }

        let mut lines = vec![Line::from(meta)];
        match item.description.as_deref() {
            Some(description) => {
                for line in wrap_description(description, content_width(area.width)) {
                    lines.push(Line::from(line));
                }
            }
            None => lines.push(Line::from(Span::styled(
                "No description",
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            ))),
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border_color))
            .title(title)
            .title_top(
                Line::from(Span::styled(stars, Style::default().fg(Color::LightYellow)))
                    .right_aligned(),
            );

        frame.render_widget(Paragraph::new(Text::from(lines)).block(block), area);
    }
}

impl Default for ResultList {
    fn default() -> Self {
        Self::new()
    }
}

fn content_width(card_width: u16) -> usize {
    // Borders plus one column of padding each side
    (card_width.saturating_sub(4) as usize).max(10)
}

fn wrap_description(text: &str, width: usize) -> Vec<String> {
    let mut lines: Vec<String> = wrap(text, width).into_iter().map(|c| c.into_owned()).collect();
    if lines.len() > MAX_DESCRIPTION_LINES {
        lines.truncate(MAX_DESCRIPTION_LINES);
        if let Some(last) = lines.last_mut() {
            *last = format!("{}…", truncate_to_width(last, width.saturating_sub(1)));
        }
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Cut `text` to at most `max` display columns
pub fn truncate_to_width(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }

    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: u64, description: Option<&str>) -> RepositoryItem {
        RepositoryItem {
            id,
            name: format!("repo{id}"),
            full_name: None,
            visibility: "public".to_string(),
            stargazers_count: 1,
            description: description.map(str::to_string),
            html_url: format!("https://github.com/o/repo{id}"),
            language: None,
        }
    }

    #[test]
    fn test_truncate_respects_display_width() {
        assert_eq!(truncate_to_width("short", 10), "short");
        assert_eq!(truncate_to_width("abcdefgh", 5), "abcd…");
        assert_eq!(truncate_to_width("日本語テキスト", 5), "日本…");
    }

    #[test]
    fn test_long_descriptions_are_elided() {
        let text = "word ".repeat(100);
        let lines = wrap_description(&text, 20);
        assert_eq!(lines.len(), MAX_DESCRIPTION_LINES);
        assert!(lines[2].ends_with('…'));
    }

    #[test]
    fn test_selection_stays_in_bounds() {
        let items = vec![item(1, None), item(2, Some("two"))];
        let mut list = ResultList::new();

        list.select_previous(&items);
        assert_eq!(list.selected(), 0);
        list.select_next(&items);
        list.select_next(&items);
        assert_eq!(list.selected(), 1);
        assert_eq!(list.selected_item(&items).map(|i| i.id), Some(2));

        list.clamp(1);
        assert_eq!(list.selected(), 0);
        list.scroll_to_top();
        assert_eq!(list.selected(), 0);
    }

    #[test]
    fn test_card_height_counts_wrapped_description() {
        assert_eq!(ResultList::card_height(&item(1, None), 40), 4);
        let long = item(2, Some(&"abc ".repeat(20)));
        assert!(ResultList::card_height(&long, 40) > 4);
    }
}
