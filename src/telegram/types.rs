use serde::Deserialize;

use crate::bot::{Incoming, IncomingKind};

/// Envelope every Bot API method answers with
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    pub text: Option<String>,
    pub location: Option<Location>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

impl User {
    pub fn display_name(&self) -> String {
        match &self.last_name {
            Some(last) => format!("{} {}", self.first_name, last),
            None => self.first_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    pub message: Option<Message>,
    pub data: Option<String>,
}

impl Update {
    /// None for update kinds the bot does not react to
    pub fn into_incoming(self) -> Option<Incoming> {
        if let Some(query) = self.callback_query {
            let chat_id = query
                .message
                .as_ref()
                .map(|m| m.chat.id)
                .unwrap_or(query.from.id);
            return Some(Incoming {
                chat_id,
                account_id: query.from.id,
                sender_name: Some(query.from.display_name()),
                kind: IncomingKind::Callback {
                    query_id: Some(query.id),
                    data: query.data?,
                },
            });
        }

        let message = self.message?;
        let from = message.from?;
        let kind = if let Some(location) = message.location {
            IncomingKind::Location {
                latitude: location.latitude,
                longitude: location.longitude,
            }
        } else {
            IncomingKind::Text(message.text?)
        };

        Some(Incoming {
            chat_id: message.chat.id,
            account_id: from.id,
            sender_name: Some(from.display_name()),
            kind,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn text_message_becomes_incoming_text() {
        let update: Update = serde_json::from_str(
            r#"{
                "update_id": 10,
                "message": {
                    "message_id": 5,
                    "from": {"id": 77, "first_name": "Ali", "last_name": "Valiyev"},
                    "chat": {"id": 77, "type": "private"},
                    "date": 1700000000,
                    "text": "/start"
                }
            }"#,
        )
        .unwrap();

        let incoming = update.into_incoming().unwrap();
        assert_eq!(incoming.account_id, 77);
        assert_eq!(incoming.sender_name.as_deref(), Some("Ali Valiyev"));
        assert_eq!(incoming.kind, IncomingKind::Text("/start".to_string()));
    }

    #[test]
    fn callback_keeps_query_id_and_chat() {
        let update: Update = serde_json::from_str(
            r#"{
                "update_id": 11,
                "callback_query": {
                    "id": "abc",
                    "from": {"id": 1001, "first_name": "Boss"},
                    "message": {"message_id": 9, "chat": {"id": 1001}},
                    "data": "advance:approve:3"
                }
            }"#,
        )
        .unwrap();

        let incoming = update.into_incoming().unwrap();
        assert_eq!(incoming.chat_id, 1001);
        assert_eq!(
            incoming.kind,
            IncomingKind::Callback {
                query_id: Some("abc".to_string()),
                data: "advance:approve:3".to_string()
            }
        );
    }

    #[test]
    fn location_wins_over_missing_text() {
        let update: Update = serde_json::from_str(
            r#"{
                "update_id": 12,
                "message": {
                    "message_id": 6,
                    "from": {"id": 5, "first_name": "W"},
                    "chat": {"id": 5},
                    "location": {"latitude": 41.3, "longitude": 69.2}
                }
            }"#,
        )
        .unwrap();

        assert!(matches!(
            update.into_incoming().unwrap().kind,
            IncomingKind::Location { .. }
        ));
    }

    #[test]
    fn unsupported_updates_are_ignored() {
        let update: Update = serde_json::from_str(r#"{"update_id": 13}"#).unwrap();
        assert!(update.into_incoming().is_none());
    }
}
