use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::user::User;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: u64,
    pub content: String,
    pub ticket_id: u64,
    pub author_id: u64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub author: User,
}

#[derive(Debug, Serialize)]
pub struct CommentCreate {
    pub content: String,
}
