//! Label-to-column reconciliation.
//!
//! Columns and conversation labels are both reduced to a [`ColumnKey`] before
//! comparison, so `"New"` on a board matches a `"new"` label. Only case is
//! folded; whitespace is significant. Buckets keep the order in which
//! conversations were fetched, and a conversation carrying the same label
//! twice still lands in that bucket once.

use crate::api::models::Conversation;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnKey(String);

impl ColumnKey {
    pub fn new(label: &str) -> Self {
        Self(label.to_lowercase())
    }
}

#[derive(Debug, Default)]
pub struct KanbanView<'a> {
    /// First spelling of each column, in board order.
    order: Vec<(String, ColumnKey)>,
    buckets: HashMap<ColumnKey, Vec<&'a Conversation>>,
}

impl<'a> KanbanView<'a> {
    /// Conversations whose labels match `column`, or `None` for a column the
    /// board does not declare.
    pub fn bucket(&self, column: &str) -> Option<&[&'a Conversation]> {
        self.buckets.get(&ColumnKey::new(column)).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Columns in board order with their cards.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[&'a Conversation])> {
        self.order
            .iter()
            .filter_map(|(label, key)| self.buckets.get(key).map(|b| (label.as_str(), b.as_slice())))
    }
}

pub fn group_by_columns<'a, S: AsRef<str>>(columns: &[S], conversations: &'a [Conversation]) -> KanbanView<'a> {
    let mut view = KanbanView::default();
    for column in columns {
        let key = ColumnKey::new(column.as_ref());
        if !view.buckets.contains_key(&key) {
            view.buckets.insert(key.clone(), Vec::new());
            view.order.push((column.as_ref().to_string(), key));
        }
    }
    if view.buckets.is_empty() {
        return view;
    }

    let mut matched = Vec::<ColumnKey>::new();
    for conv in conversations {
        matched.clear();
        for label in &conv.labels {
            let key = ColumnKey::new(label);
            if matched.contains(&key) {
                continue;
            }
            if let Some(bucket) = view.buckets.get_mut(&key) {
                bucket.push(conv);
                matched.push(key);
            }
        }
    }
    view
}
