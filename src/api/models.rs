use serde::{Deserialize, Deserializer, Serialize};

/// Helpdesk records send `null` where a field is empty; read it as the default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Conversation {
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub labels: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub meta: ConversationMeta,
    #[serde(default, deserialize_with = "null_as_default")]
    pub messages: Vec<Message>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub messages_count: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub timestamp: i64,
}

impl Conversation {
    /// Content of the first message, if the thread has any text yet.
    pub fn preview(&self) -> Option<&str> {
        self.messages
            .first()
            .and_then(|m| m.content.as_deref())
            .filter(|c| !c.trim().is_empty())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct ConversationMeta {
    #[serde(default, deserialize_with = "null_as_default")]
    pub sender: Sender,
    #[serde(default)]
    pub assignee: Option<Assignee>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Sender {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Assignee {
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Message {
    #[serde(default)]
    pub content: Option<String>,
}

#[cfg(test)]
pub(crate) fn conversation(id: u64, labels: &[&str]) -> Conversation {
    Conversation {
        id,
        labels: labels.iter().map(|l| l.to_string()).collect(),
        meta: ConversationMeta::default(),
        messages: Vec::new(),
        messages_count: 0,
        timestamp: 0,
    }
}
