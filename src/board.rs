use crate::error::{Error, Result};
use crate::view_model::ColumnKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A kanban definition as stored in the board collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: String,
    pub name: String,
    pub columns: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Validated input for board creation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBoard {
    name: String,
    columns: Vec<String>,
}

impl NewBoard {
    /// Names and columns are trimmed; blank columns are dropped and columns
    /// that fold to the same key keep only their first spelling.
    pub fn new<I, S>(name: &str, columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidBoard("name must not be empty"));
        }
        let mut seen = Vec::<ColumnKey>::new();
        let mut kept = Vec::new();
        for column in columns {
            let column = column.as_ref().trim();
            if column.is_empty() {
                continue;
            }
            let key = ColumnKey::new(column);
            if seen.contains(&key) {
                continue;
            }
            seen.push(key);
            kept.push(column.to_string());
        }
        if kept.is_empty() {
            return Err(Error::InvalidBoard("at least one column is required"));
        }
        Ok(Self {
            name: name.to_string(),
            columns: kept,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_dedupes_columns() {
        let board = NewBoard::new(" Ventas ", ["nuevo", " Interesado", "", "NUEVO", "cerrado "]).unwrap();
        assert_eq!(board.name(), "Ventas");
        assert_eq!(board.columns(), ["nuevo", "Interesado", "cerrado"]);
    }

    #[test]
    fn rejects_blank_name() {
        assert!(matches!(NewBoard::new("  ", ["todo"]), Err(Error::InvalidBoard(_))));
    }

    #[test]
    fn rejects_missing_columns() {
        assert!(matches!(NewBoard::new("Support", [" ", ""]), Err(Error::InvalidBoard(_))));
        assert!(matches!(NewBoard::new("Support", Vec::<String>::new()), Err(Error::InvalidBoard(_))));
    }

    #[test]
    fn document_uses_camel_case_timestamp() {
        let board = Board {
            id: "b1".into(),
            name: "Support".into(),
            columns: vec!["todo".into()],
            created_at: DateTime::parse_from_rfc3339("2024-05-01T10:00:00Z").unwrap().with_timezone(&Utc),
        };
        let json = serde_json::to_value(&board).unwrap();
        assert_eq!(json["createdAt"], "2024-05-01T10:00:00Z");
        assert_eq!(json["columns"][0], "todo");
    }
}
