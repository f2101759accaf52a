use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Organize,
    Tag,
}

impl OperationKind {
    pub fn as_db_str(self) -> &'static str {
        match self {
            OperationKind::Organize => "organize",
            OperationKind::Tag => "tag",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "organize" => Some(OperationKind::Organize),
            "tag" => Some(OperationKind::Tag),
            _ => None,
        }
    }
}

/// A persisted, reversible record of an executed bulk mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub id: i64,
    pub kind: OperationKind,
    pub payload: String,
    pub created_at: String,
}

/// Payload recorded for an `organize` journal entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizeOperationPayload {
    pub workspace_id: i64,
    pub moves: Vec<OrganizeMove>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizeMove {
    pub file_id: i64,
    pub from: String,
    pub to: String,
}
