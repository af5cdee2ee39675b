use serde::{Deserialize, Serialize};

/// A list a client can keep a live view of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Users,
    Assignments,
    Submissions,
    Withdrawals,
}

// ── Client -> Server messages ──

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Start receiving snapshots of a collection. One is sent right away.
    Subscribe { collection: Collection },
    Unsubscribe { collection: Collection },
    /// Ask for a fresh snapshot without waiting for a change.
    Refresh { collection: Collection },
}

// ── Server -> Client messages ──

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// The viewer's full list for `collection`; replaces whatever the
    /// client held before.
    Snapshot {
        collection: Collection,
        items: serde_json::Value,
    },
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_messages_are_tagged() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"subscribe","collection":"submissions"}"#).unwrap();
        assert!(matches!(
            msg,
            ClientMessage::Subscribe {
                collection: Collection::Submissions
            }
        ));
    }

    #[test]
    fn snapshot_serializes_with_collection_name() {
        let msg = ServerMessage::Snapshot {
            collection: Collection::Withdrawals,
            items: serde_json::json!([]),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "snapshot");
        assert_eq!(json["collection"], "withdrawals");
    }
}
