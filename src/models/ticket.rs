use std::fmt;

use chrono::NaiveDateTime;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::comment::Comment;
use super::user::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    #[value(name = "in_progress")]
    InProgress,
    Resolved,
    Closed,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::InProgress => "in_progress",
            TicketStatus::Resolved => "resolved",
            TicketStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TicketPriority {
    Low,
    Medium,
    High,
    Critical,
}

impl TicketPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketPriority::Low => "low",
            TicketPriority::Medium => "medium",
            TicketPriority::High => "high",
            TicketPriority::Critical => "critical",
        }
    }
}

impl fmt::Display for TicketPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Full ticket as returned by the detail, create and update endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub creator_id: u64,
    #[serde(default)]
    pub assigned_to_id: Option<u64>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    #[serde(default)]
    pub resolved_at: Option<NaiveDateTime>,
    pub creator: User,
    #[serde(default)]
    pub assigned_to: Option<User>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

/// Slimmer row shape the list endpoint returns (no description, no comments).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketListItem {
    pub id: u64,
    pub title: String,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub creator_id: u64,
    #[serde(default)]
    pub assigned_to_id: Option<u64>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub creator: User,
    #[serde(default)]
    pub assigned_to: Option<User>,
}

#[derive(Debug, Serialize)]
pub struct TicketCreate {
    pub title: String,
    pub description: String,
    pub priority: TicketPriority,
}

/// Partial update body. Fields left as `None` are omitted from the JSON so
/// the backend keeps their current values.
#[derive(Debug, Default, Serialize)]
pub struct TicketUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TicketStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TicketPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to_id: Option<u64>,
}

impl TicketUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.assigned_to_id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_wire_names() {
        let raw = "\"in_progress\"";
        let status: TicketStatus = serde_json::from_str(raw).unwrap();
        assert_eq!(status, TicketStatus::InProgress);
        assert_eq!(serde_json::to_string(&status).unwrap(), raw);
        assert_eq!(status.as_str(), "in_progress");
    }

    #[test]
    fn test_priority_wire_names() {
        assert_eq!(
            serde_json::to_string(&TicketPriority::Critical).unwrap(),
            "\"critical\""
        );
        let priority: TicketPriority = serde_json::from_str("\"low\"").unwrap();
        assert_eq!(priority, TicketPriority::Low);
    }

    #[test]
    fn test_ticket_deserializes_backend_payload() {
        let raw = r#"{
            "id": 42,
            "title": "Printer on floor 3 is jammed",
            "description": "Paper tray 2 keeps jamming on duplex jobs.",
            "status": "open",
            "priority": "high",
            "creator_id": 1,
            "assigned_to_id": null,
            "created_at": "2025-08-12T14:05:00",
            "updated_at": "2025-08-12T14:05:00",
            "resolved_at": null,
            "creator": {
                "id": 1,
                "email": "agent@example.com",
                "username": "agent",
                "full_name": null,
                "is_active": true,
                "is_admin": false,
                "created_at": "2025-08-01T09:30:00",
                "updated_at": "2025-08-01T09:30:00"
            },
            "assigned_to": null,
            "comments": []
        }"#;

        let ticket: Ticket = serde_json::from_str(raw).unwrap();
        assert_eq!(ticket.id, 42);
        assert_eq!(ticket.status, TicketStatus::Open);
        assert_eq!(ticket.priority, TicketPriority::High);
        assert_eq!(ticket.assigned_to, None);
        assert!(ticket.comments.is_empty());
        assert_eq!(ticket.creator.username, "agent");
    }

    #[test]
    fn test_list_item_has_no_description() {
        let raw = r#"{
            "id": 7,
            "title": "VPN drops every hour",
            "status": "in_progress",
            "priority": "medium",
            "creator_id": 2,
            "created_at": "2025-08-10T08:00:00",
            "updated_at": "2025-08-11T16:20:00",
            "creator": {
                "id": 2,
                "email": "b@example.com",
                "username": "bee",
                "is_active": true,
                "is_admin": false,
                "created_at": "2025-08-01T09:30:00",
                "updated_at": "2025-08-01T09:30:00"
            }
        }"#;

        let item: TicketListItem = serde_json::from_str(raw).unwrap();
        assert_eq!(item.id, 7);
        assert_eq!(item.status, TicketStatus::InProgress);
        assert_eq!(item.assigned_to_id, None);
    }

    #[test]
    fn test_update_omits_unset_fields() {
        let patch = TicketUpdate {
            status: Some(TicketStatus::Closed),
            ..Default::default()
        };

        let raw = serde_json::to_string(&patch).unwrap();
        assert_eq!(raw, r#"{"status":"closed"}"#);
    }

    #[test]
    fn test_update_is_empty() {
        assert!(TicketUpdate::default().is_empty());
        let patch = TicketUpdate {
            title: Some("New title".to_string()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}
