//! To-do list with emoji tags and manual ordering

use crate::store::{read_json, write_json, PreferenceStore, KEY_TODOS};
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Emoji tags cycled with `cycle_emoji`
pub const EMOJIS: &[&str] = &["📌", "🔥", "⭐", "💡", "📚", "🛒"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    pub text: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub emoji: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TodoList {
    pub items: Vec<TodoItem>,
    pub selected: usize,
}

impl TodoList {
    pub fn load(store: &dyn PreferenceStore) -> Self {
        Self {
            items: read_json(store, KEY_TODOS).unwrap_or_default(),
            selected: 0,
        }
    }

    pub fn save(&self, store: &mut dyn PreferenceStore) -> Result<()> {
        write_json(store, KEY_TODOS, &self.items)
    }

    /// Append a task and select it. Blank text is ignored.
    pub fn add(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        self.items.push(TodoItem {
            text: text.to_string(),
            done: false,
            emoji: None,
        });
        self.selected = self.items.len() - 1;
        true
    }

    pub fn toggle_done(&mut self) -> bool {
        match self.items.get_mut(self.selected) {
            Some(item) => {
                item.done = !item.done;
                true
            }
            None => false,
        }
    }

    pub fn remove_selected(&mut self) -> Option<TodoItem> {
        if self.selected >= self.items.len() {
            return None;
        }
        let item = self.items.remove(self.selected);
        self.selected = self.selected.min(self.items.len().saturating_sub(1));
        Some(item)
    }

    /// Advance the emoji tag: none → first → ... → last → none
    pub fn cycle_emoji(&mut self) -> bool {
        let Some(item) = self.items.get_mut(self.selected) else {
            return false;
        };
        let current = item
            .emoji
            .as_deref()
            .and_then(|e| EMOJIS.iter().position(|x| *x == e));
        item.emoji = match current {
            None => Some(EMOJIS[0].to_string()),
            Some(i) if i + 1 < EMOJIS.len() => Some(EMOJIS[i + 1].to_string()),
            Some(_) => None,
        };
        true
    }

    /// Swap the selected item with its upper neighbour, keeping it selected
    pub fn move_up(&mut self) -> bool {
        if self.selected == 0 || self.selected >= self.items.len() {
            return false;
        }
        self.items.swap(self.selected, self.selected - 1);
        self.selected -= 1;
        true
    }

    pub fn move_down(&mut self) -> bool {
        if self.selected + 1 >= self.items.len() {
            return false;
        }
        self.items.swap(self.selected, self.selected + 1);
        self.selected += 1;
        true
    }

    pub fn select_next(&mut self) {
        if self.selected < self.items.len().saturating_sub(1) {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn remaining(&self) -> usize {
        self.items.iter().filter(|i| !i.done).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn list(texts: &[&str]) -> TodoList {
        let mut list = TodoList::default();
        for text in texts {
            list.add(text);
        }
        list
    }

    #[test]
    fn test_add_selects_new_item() {
        let mut todos = list(&["a", "b"]);
        assert_eq!(todos.selected, 1);
        assert!(!todos.add("  "));
        assert_eq!(todos.items.len(), 2);
    }

    #[test]
    fn test_reorder() {
        let mut todos = list(&["a", "b", "c"]);
        todos.selected = 2;
        assert!(todos.move_up());
        assert!(todos.move_up());
        assert!(!todos.move_up());
        let order: Vec<&str> = todos.items.iter().map(|i| i.text.as_str()).collect();
        assert_eq!(order, ["c", "a", "b"]);
        assert_eq!(todos.selected, 0);

        assert!(todos.move_down());
        assert_eq!(todos.items[1].text, "c");
        todos.selected = 2;
        assert!(!todos.move_down());
    }

    #[test]
    fn test_toggle_and_remove() {
        let mut todos = list(&["a", "b"]);
        todos.toggle_done();
        assert_eq!(todos.remaining(), 1);

        let removed = todos.remove_selected().unwrap();
        assert_eq!(removed.text, "b");
        assert_eq!(todos.selected, 0);
        todos.remove_selected();
        assert!(todos.remove_selected().is_none());
        assert!(!todos.toggle_done());
    }

    #[test]
    fn test_emoji_cycle_wraps_to_none() {
        let mut todos = list(&["a"]);
        for expected in EMOJIS {
            todos.cycle_emoji();
            assert_eq!(todos.items[0].emoji.as_deref(), Some(*expected));
        }
        todos.cycle_emoji();
        assert_eq!(todos.items[0].emoji, None);
    }

    #[test]
    fn test_persistence() {
        let mut store = MemoryStore::new();
        let mut todos = list(&["write report", "buy milk"]);
        todos.cycle_emoji();
        todos.save(&mut store).unwrap();

        let restored = TodoList::load(&store);
        assert_eq!(restored.items, todos.items);
        assert_eq!(restored.selected, 0);
    }
}
