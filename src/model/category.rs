use serde::{Deserialize, Serialize};

/// A sport category as listed by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
}

/// How an event refers to its category.
///
/// Depending on the endpoint the backend either sends the bare id, the
/// populated category document, or a document stub holding only the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryRef {
    Id(String),
    Populated {
        #[serde(rename = "_id", alias = "id")]
        id: String,
        name: String,
    },
    Unpopulated {
        #[serde(rename = "_id", alias = "id")]
        id: String,
    },
}

impl CategoryRef {
    pub fn id(&self) -> &str {
        match self {
            CategoryRef::Id(id)
            | CategoryRef::Populated { id, .. }
            | CategoryRef::Unpopulated { id } => id,
        }
    }

    /// The embedded name, only available for populated references.
    pub fn name(&self) -> Option<&str> {
        match self {
            CategoryRef::Populated { name, .. } => Some(name),
            _ => None,
        }
    }
}
