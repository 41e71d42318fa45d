//! Terminal rendering of store snapshots.

use crate::api::Item;
use crate::store::StateSnapshot;
use std::fmt::Write;

/// Pages shown around the current one before ellipses kick in
const SHOW_PAGES: u32 = 5;

/// One entry of the pagination bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMarker {
    Page(u32),
    Ellipsis,
}

/// Compute the pagination bar for `current` out of `total` pages
pub fn page_window(current: u32, total: u32) -> Vec<PageMarker> {
    use PageMarker::{Ellipsis, Page};

    let total = total.max(1);
    let current = current.clamp(1, total);

    if total <= SHOW_PAGES + 2 {
        return (1..=total).map(Page).collect();
    }

    let mut markers = Vec::with_capacity(SHOW_PAGES as usize + 2);
    if current <= 3 {
        markers.extend((1..=SHOW_PAGES).map(Page));
        markers.push(Ellipsis);
        markers.push(Page(total));
    } else if current >= total - 2 {
        markers.push(Page(1));
        markers.push(Ellipsis);
        markers.extend((total - SHOW_PAGES + 1..=total).map(Page));
    } else {
        markers.push(Page(1));
        markers.push(Ellipsis);
        markers.extend((current - 1..=current + 1).map(Page));
        markers.push(Ellipsis);
        markers.push(Page(total));
    }
    markers
}

/// Render the pagination bar, highlighting the current page
pub fn render_pagination(current: u32, total: u32) -> String {
    page_window(current, total)
        .into_iter()
        .map(|marker| match marker {
            PageMarker::Page(page) if page == current => format!("[{}]", page),
            PageMarker::Page(page) => page.to_string(),
            PageMarker::Ellipsis => "...".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn summary_line(item: &Item) -> String {
    let mut line = format!("#{:<6} {}", item.mal_id, item.title().unwrap_or("Untitled"));
    if let Some(kind) = item.anime_type() {
        let _ = write!(line, " ({})", kind);
    }
    if let Some(score) = item.score() {
        let _ = write!(line, "  * {:.2}", score);
    }
    if let Some(episodes) = item.episodes() {
        let _ = write!(line, "  {} eps", episodes);
    }
    line
}

/// Render the error panel, with guidance when rate limited
pub fn render_error(state: &StateSnapshot) -> Option<String> {
    let message = state.error_message()?;
    let mut out = String::new();
    if state.is_rate_limited() {
        let _ = writeln!(out, "Slow down! {}", message);
        let _ = writeln!(
            out,
            "Tip: wait a few seconds between searches to avoid rate limiting."
        );
    } else {
        let _ = writeln!(out, "Something went wrong: {}", message);
    }
    Some(out)
}

/// Render the list view: error, empty state or results plus pagination
pub fn render_list(state: &StateSnapshot) -> String {
    if let Some(error) = render_error(state) {
        return error;
    }
    if state.loading {
        return "Loading...\n".to_string();
    }

    let mut out = String::new();
    if state.query.trim().is_empty() {
        let _ = writeln!(out, "Top Trending Anime");
    } else {
        let _ = writeln!(out, "Results for \"{}\"", state.query.trim());
    }

    if state.results.is_empty() {
        let _ = writeln!(out, "No results found. Try different keywords!");
        return out;
    }

    for item in &state.results {
        let _ = writeln!(out, "{}", summary_line(item));
    }
    if state.total_pages > 1 {
        let _ = writeln!(
            out,
            "\n{}",
            render_pagination(state.current_page, state.total_pages)
        );
    }
    out
}

/// Render the detail view for the selected record
pub fn render_detail(state: &StateSnapshot) -> String {
    if let Some(error) = render_error(state) {
        return error;
    }
    let Some(item) = &state.selected_item else {
        return "Anime not found\n".to_string();
    };

    let mut out = String::new();
    let _ = writeln!(out, "{}", item.title().unwrap_or("Untitled"));
    if let Some(english) = item.title_english() {
        let _ = writeln!(out, "{}", english);
    }
    let _ = writeln!(out, "{}", summary_line(item));
    if let Some(status) = item.status() {
        let _ = writeln!(out, "Status: {}", status);
    }
    if let Some(year) = item.year() {
        let _ = writeln!(out, "Year: {}", year);
    }
    let genres = item.genres();
    if !genres.is_empty() {
        let _ = writeln!(out, "Genres: {}", genres.join(", "));
    }
    if let Some(synopsis) = item.synopsis() {
        let _ = writeln!(out, "\n{}", synopsis);
    }
    out
}

/// Render the featured strip of the home page
pub fn render_featured(items: &[Item]) -> String {
    let mut out = String::new();
    for (idx, item) in items.iter().enumerate() {
        let _ = writeln!(out, "{:>2}. {}", idx + 1, summary_line(item));
        if let Some(url) = item.image_url() {
            let _ = writeln!(out, "    {}", url);
        }
    }
    out
}
