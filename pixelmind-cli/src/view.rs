use std::sync::{Mutex, MutexGuard};

use pixelmind_client::{
    DiscoverState, FeedPhase, FeedState, FormKind, FormState, Post, PostCard, SearchState, View,
};

/// Печатает состояние контроллеров в stdout.
///
/// Страница ленты печатается при переходе в `Loaded`. Discover накапливает
/// карточки, поэтому печатаются только новые; найденный пост печатается один раз.
#[derive(Debug, Default)]
pub struct TerminalView {
    feed_phase: Mutex<FeedPhase>,
    discover_printed: Mutex<usize>,
    discover_status: Mutex<String>,
    search_result: Mutex<Option<Post>>,
}

impl TerminalView {
    pub fn new() -> Self {
        Self::default()
    }
}

impl View for TerminalView {
    fn render_feed(&self, state: &FeedState) {
        let mut phase = lock(&self.feed_phase);
        let entered_loaded = state.phase == FeedPhase::Loaded && *phase != FeedPhase::Loaded;
        *phase = state.phase;
        if !entered_loaded {
            print_status("feed", &state.status);
            return;
        }

        println!("Лента, страница {}: {}", state.page + 1, state.status);
        for post in &state.posts {
            println!("{}", format_card(&PostCard::from(post)));
        }
    }

    fn render_discover(&self, state: &DiscoverState) {
        let mut printed = lock(&self.discover_printed);
        if state.items.len() < *printed {
            *printed = 0;
        }

        if !state.loading {
            for card in &state.items[*printed..] {
                println!("{}", format_card(card));
            }
            *printed = state.items.len();
        }

        let mut last_status = lock(&self.discover_status);
        if *last_status != state.status {
            print_status("discover", &state.status);
            last_status.clone_from(&state.status);
        }
    }

    fn render_search(&self, state: &SearchState) {
        let mut shown = lock(&self.search_result);
        if *shown != state.result {
            if let Some(post) = &state.result {
                println!("{}", format_card(&PostCard::from(post)));
            }
            shown.clone_from(&state.result);
        }
        print_status("search", &state.status);
    }

    fn render_form(&self, kind: FormKind, state: &FormState) {
        let label = match kind {
            FormKind::Create => "create",
            FormKind::Update => "update",
        };
        print_status(label, &state.status);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn print_status(label: &str, status: &str) {
    if !status.is_empty() {
        println!("[{label}] {status}");
    }
}

/// Карточка в несколько строк: заголовок, автор и дата, ссылки, теги.
pub fn format_card(card: &PostCard) -> String {
    let mut lines = Vec::new();

    let id = card.id.map(|id| format!("[{id}] ")).unwrap_or_default();
    lines.push(format!("- {id}{}", card.title));

    let mut byline = format!("  by {}", card.author);
    if let Some(date) = card.display_date() {
        byline.push_str(&format!(", {date}"));
    }
    lines.push(byline);

    if card.has_image() {
        lines.push(format!("  image: {} ({})", card.image, card.alt));
    }
    if let Some(description) = card.description.as_deref().filter(|d| !d.is_empty()) {
        lines.push(format!("  {description}"));
    }
    if let Some(url) = card.url.as_deref().filter(|u| !u.is_empty()) {
        lines.push(format!("  url: {url}"));
    }
    if !card.tags.is_empty() {
        let tags: Vec<String> = card.tags.iter().map(|tag| format!("#{tag}")).collect();
        lines.push(format!("  {}", tags.join(" ")));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card() -> PostCard {
        PostCard {
            id: Some(7),
            title: "Café y estudio".to_string(),
            image: "img-seed/coffee-study.jpg".to_string(),
            alt: "Café y estudio".to_string(),
            description: Some(String::new()),
            url: None,
            tags: vec!["estudio".to_string(), "café".to_string()],
            author: "admin".to_string(),
            posted_at: Some("2025-10-24T00:00:00".to_string()),
        }
    }

    #[test]
    fn format_card_skips_empty_fields() {
        let text = format_card(&card());

        assert_eq!(
            text,
            "- [7] Café y estudio\n  by admin, 24 October 2025\n  image: img-seed/coffee-study.jpg (Café y estudio)\n  #estudio #café"
        );
    }

    #[test]
    fn format_card_without_id_or_date() {
        let mut card = card();
        card.id = None;
        card.posted_at = None;
        card.tags.clear();

        let text = format_card(&card);

        assert!(text.starts_with("- Café y estudio\n  by admin\n"));
    }

    #[test]
    fn discover_counter_resets_when_items_shrink() {
        let view = TerminalView::new();
        let mut state = DiscoverState {
            items: vec![card(), card()],
            loaded: 2,
            status: String::new(),
            loading: false,
        };
        view.render_discover(&state);
        assert_eq!(*view.discover_printed.lock().expect("lock"), 2);

        state.items.truncate(1);
        view.render_discover(&state);
        assert_eq!(*view.discover_printed.lock().expect("lock"), 1);
    }

    #[test]
    fn feed_phase_follows_rendered_state() {
        let view = TerminalView::new();
        let mut state = FeedState {
            phase: FeedPhase::Loading,
            ..FeedState::default()
        };
        view.render_feed(&state);
        assert_eq!(*view.feed_phase.lock().expect("lock"), FeedPhase::Loading);

        state.phase = FeedPhase::Loaded;
        view.render_feed(&state);
        assert_eq!(*view.feed_phase.lock().expect("lock"), FeedPhase::Loaded);
    }
}
