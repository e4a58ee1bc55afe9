//! Plain-text rendering for the one-shot `--query` mode.

use crate::search::{page_count, SearchPage, SearchParams};
use std::fmt::Write;

/// Format one page of results for stdout
pub fn format_page(params: &SearchParams, per_page: u32, page: &SearchPage) -> String {
    let mut out = String::new();

    if page.items.is_empty() {
        let _ = writeln!(out, "No repositories found for \"{}\".", params.keyword);
        return out;
    }

    let _ = writeln!(out, "Search Result:");
    for item in &page.items {
        let _ = writeln!(
            out,
            "\n{} [{}] {} Stars",
            item.display_name(),
            item.visibility,
            item.stargazers_count
        );
        if let Some(description) = item.description.as_deref().filter(|d| !d.trim().is_empty()) {
            let _ = writeln!(out, "  {}", description.trim());
        }
        let _ = writeln!(out, "  {}", item.html_url);
    }

    let pages = page_count(page.total_count, per_page);
    let _ = writeln!(
        out,
        "\nPage {} of {} ({} repositories)",
        params.page, pages, page.total_count
    );
    if page.incomplete_results {
        let _ = writeln!(out, "Results may be incomplete: the search timed out upstream.");
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::RepositoryItem;

    #[test]
    fn test_formats_items_and_page_footer() {
        let page = SearchPage {
            total_count: 250,
            incomplete_results: false,
            items: vec![RepositoryItem {
                id: 1,
                name: "react".to_string(),
                full_name: Some("facebook/react".to_string()),
                visibility: "public".to_string(),
                stargazers_count: 230000,
                description: Some("The library for web and native user interfaces.".to_string()),
                html_url: "https://github.com/facebook/react".to_string(),
                language: Some("JavaScript".to_string()),
            }],
        };

        let text = format_page(&SearchParams::new("react", 4), 10, &page);

        assert!(text.contains("facebook/react [public] 230000 Stars"));
        assert!(text.contains("  https://github.com/facebook/react"));
        assert!(text.ends_with("Page 4 of 25 (250 repositories)\n"));
    }

    #[test]
    fn test_empty_page_message() {
        let page = SearchPage {
            total_count: 0,
            incomplete_results: false,
            items: Vec::new(),
        };
        let text = format_page(&SearchParams::first_page("zzzz"), 10, &page);
        assert_eq!(text, "No repositories found for \"zzzz\".\n");
    }
}
