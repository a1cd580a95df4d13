use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders, List as RatatuiList, ListItem, ListState};

use crate::Theme;
use crate::config::{KeyResolver, NavAction};
use crate::ui::{Component, EventResult, Result};

const PAGE_STEP: usize = 5;

pub enum ListEvent<T> {
    Changed(T),
    Activated(T),
}

pub trait ListRow {
    fn render_row(&self, theme: &Theme) -> ListItem<'static>;
}

/// Bordered, selectable list.
pub struct List<T: ListRow + Clone> {
    items: Vec<T>,
    state: ListState,
    title: Option<String>,
    resolver: Arc<KeyResolver>,
}

impl<T: ListRow + Clone> List<T> {
    pub fn new(items: Vec<T>, resolver: Arc<KeyResolver>) -> Self {
        let mut state = ListState::default();
        if !items.is_empty() {
            state.select(Some(0));
        }
        Self {
            items,
            state,
            title: None,
            resolver,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn selected(&self) -> Option<&T> {
        self.state.selected().and_then(|i| self.items.get(i))
    }

    fn get_change_event(&self, before: Option<usize>) -> EventResult<ListEvent<T>> {
        if let Some(selected) = self.state.selected()
            && Some(selected) != before
            && let Some(item) = self.items.get(selected)
        {
            return ListEvent::Changed(item.clone()).into();
        }
        EventResult::Consumed
    }
}

impl<T: ListRow + Clone> Component for List<T> {
    type Output = ListEvent<T>;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        if self.items.is_empty() {
            return Ok(EventResult::Ignored);
        }
        let before = self.state.selected();
        let last = self.items.len() - 1;

        if self.resolver.matches_nav(&key, NavAction::Down) {
            self.state.select(Some(before.map_or(0, |i| usize::min(i + 1, last))));
            return Ok(self.get_change_event(before));
        }
        if self.resolver.matches_nav(&key, NavAction::Up) {
            self.state.select(Some(before.map_or(0, |i| i.saturating_sub(1))));
            return Ok(self.get_change_event(before));
        }
        if self.resolver.matches_nav(&key, NavAction::Home) {
            self.state.select(Some(0));
            return Ok(self.get_change_event(before));
        }
        if self.resolver.matches_nav(&key, NavAction::End) {
            self.state.select(Some(last));
            return Ok(self.get_change_event(before));
        }
        if self.resolver.matches_nav(&key, NavAction::PageDown) {
            let new_index = before.map_or(0, |i| usize::min(i + PAGE_STEP, last));
            self.state.select(Some(new_index));
            return Ok(self.get_change_event(before));
        }
        if self.resolver.matches_nav(&key, NavAction::PageUp) {
            let new_index = before.map_or(0, |i| i.saturating_sub(PAGE_STEP));
            self.state.select(Some(new_index));
            return Ok(self.get_change_event(before));
        }
        if self.resolver.matches_nav(&key, NavAction::Select) {
            if let Some(item) = self.selected() {
                return Ok(ListEvent::Activated(item.clone()).into());
            }
            return Ok(EventResult::Ignored);
        }

        Ok(EventResult::Ignored)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let items: Vec<ListItem> = self.items.iter().map(|i| i.render_row(theme)).collect();

        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.surface2()));
        if let Some(title) = &self.title {
            block = block
                .title(format!(" {title} "))
                .title_style(Style::default().fg(theme.mauve()).add_modifier(Modifier::BOLD));
        }

        let list = RatatuiList::new(items)
            .block(block)
            .highlight_style(
                Style::default()
                    .bg(theme.selection_bg())
                    .fg(theme.mauve())
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");

        frame.render_stateful_widget(list, area, &mut self.state);
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers};
    use ratatui::text::Line;

    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Row(&'static str);

    impl ListRow for Row {
        fn render_row(&self, _theme: &Theme) -> ListItem<'static> {
            ListItem::new(Line::from(self.0))
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn list() -> List<Row> {
        List::new(
            vec![Row("one"), Row("two"), Row("three")],
            Arc::new(KeyResolver::default()),
        )
    }

    #[test]
    fn test_navigation_clamps_at_edges() {
        let mut list = list();
        assert!(matches!(
            list.handle_key(key(KeyCode::Up)).unwrap(),
            EventResult::Consumed
        ));
        assert_eq!(list.selected(), Some(&Row("one")));

        list.handle_key(key(KeyCode::Char('G'))).unwrap();
        assert_eq!(list.selected(), Some(&Row("three")));
        assert!(matches!(
            list.handle_key(key(KeyCode::Down)).unwrap(),
            EventResult::Consumed
        ));
    }

    #[test]
    fn test_select_activates_current_row() {
        let mut list = list();
        list.handle_key(key(KeyCode::Char('j'))).unwrap();
        match list.handle_key(key(KeyCode::Enter)).unwrap() {
            EventResult::Event(ListEvent::Activated(row)) => assert_eq!(row, Row("two")),
            _ => panic!("expected activation"),
        }
    }

    #[test]
    fn test_empty_list_ignores_keys() {
        let mut list: List<Row> = List::new(vec![], Arc::new(KeyResolver::default()));
        assert!(!list.handle_key(key(KeyCode::Enter)).unwrap().is_consumed());
        assert!(list.items.is_empty());
    }
}
