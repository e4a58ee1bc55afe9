use crate::search::{PageLink, Paginator};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

const PREVIOUS_LABEL: &str = "< previous";
const NEXT_LABEL: &str = "next >";
const BREAK_LABEL: &str = "...";

/// Build the page bar line: `< previous  1 ... 4 [5] 6 ... 25  next >`
pub fn page_bar(paginator: &Paginator) -> Line<'static> {
    let enabled = Style::default().fg(Color::LightBlue);
    let disabled = Style::default().fg(Color::DarkGray);

    let mut spans = vec![
        Span::styled(
            PREVIOUS_LABEL,
            if paginator.has_previous() { enabled } else { disabled },
        ),
        Span::raw("  "),
    ];

    for link in paginator.links() {
        match link {
            PageLink::Page(index) if index == paginator.selected => spans.push(Span::styled(
                format!("[{}]", index + 1),
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::LightBlue)
                    .add_modifier(Modifier::BOLD),
            )),
            PageLink::Page(index) => spans.push(Span::raw(format!("{}", index + 1))),
            PageLink::Break => spans.push(Span::styled(BREAK_LABEL, disabled)),
        }
        spans.push(Span::raw(" "));
    }

    spans.push(Span::raw(" "));
    spans.push(Span::styled(
        NEXT_LABEL,
        if paginator.has_next() { enabled } else { disabled },
    ));

    Line::from(spans)
}

/// Render the page bar centered in `area`
pub fn render(frame: &mut Frame, area: Rect, paginator: &Paginator) {
    let bar = Paragraph::new(page_bar(paginator)).alignment(Alignment::Center);
    frame.render_widget(bar, area);
}
