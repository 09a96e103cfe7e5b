use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BookId, MemberRef};

/// イベント：書籍が貸し出された
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookBorrowed {
    pub book_id: BookId,
    pub borrowed_by: MemberRef,
    pub borrowed_at: DateTime<Utc>,
}

/// イベント：書籍が返却された
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookReturned {
    pub book_id: BookId,
    pub returned_by: MemberRef,
    pub returned_at: DateTime<Utc>,
}

/// ドメインイベント統合型
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DomainEvent {
    BookBorrowed(BookBorrowed),
    BookReturned(BookReturned),
}

impl From<BookBorrowed> for DomainEvent {
    fn from(event: BookBorrowed) -> Self {
        DomainEvent::BookBorrowed(event)
    }
}

impl From<BookReturned> for DomainEvent {
    fn from(event: BookReturned) -> Self {
        DomainEvent::BookReturned(event)
    }
}
