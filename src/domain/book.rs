use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{
    BookBorrowed, BookError, BookId, BookReturned, MemberId, MemberRef, ValidationError,
    value_objects::require_non_blank,
};

/// 貸出記録（直近の貸出）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct BorrowRecord {
    at: DateTime<Utc>,
    by: MemberRef,
}

/// 返却記録（直近の返却）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ReturnRecord {
    at: DateTime<Utc>,
    by: MemberRef,
}

/// 現在の貸出の詳細
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowDetails {
    pub borrowed_at: DateTime<Utc>,
    pub borrowed_by_name: String,
    pub borrowed_by_id: MemberId,
}

/// 直近の返却の詳細
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnDetails {
    pub returned_at: DateTime<Utc>,
    pub returned_by_name: String,
    pub returned_by_id: MemberId,
}

/// 書籍の履歴ビュー（現在の状態 + 直近の貸出 + 直近の返却）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookHistory {
    pub book_id: BookId,
    pub title: String,
    pub available: bool,
    pub borrow_details: Option<BorrowDetails>,
    pub return_details: Option<ReturnDetails>,
}

/// 書籍エンティティ - 1レコード = 1冊
///
/// 不変条件：`available == true` ⇔ 貸出記録がない。
/// 貸出記録は `Option` 一つで持つため、貸出日時と借り手が片方だけ
/// 設定された状態は表現できない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    id: BookId,
    title: String,
    author: String,
    genre: String,
    borrowed: Option<BorrowRecord>,
    returned: Option<ReturnRecord>,
}

impl Book {
    /// 新しい書籍を作成する（貸出可能な状態）
    ///
    /// # エラー
    /// タイトル・著者・ジャンルが空の場合は`ValidationError::EmptyField`
    pub fn new(
        id: BookId,
        title: impl Into<String>,
        author: impl Into<String>,
        genre: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            id,
            title: require_non_blank("title", title)?,
            author: require_non_blank("author", author)?,
            genre: require_non_blank("genre", genre)?,
            borrowed: None,
            returned: None,
        })
    }

    pub fn id(&self) -> BookId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn genre(&self) -> &str {
        &self.genre
    }

    pub fn is_available(&self) -> bool {
        self.borrowed.is_none()
    }

    pub fn is_available_to_borrow(&self) -> bool {
        self.is_available()
    }

    pub fn borrowed_at(&self) -> Option<DateTime<Utc>> {
        self.borrowed.as_ref().map(|record| record.at)
    }

    pub fn borrowed_by(&self) -> Option<&MemberRef> {
        self.borrowed.as_ref().map(|record| &record.by)
    }

    pub fn returned_at(&self) -> Option<DateTime<Utc>> {
        self.returned.as_ref().map(|record| record.at)
    }

    pub fn returned_by(&self) -> Option<&MemberRef> {
        self.returned.as_ref().map(|record| &record.by)
    }

    /// 書籍を貸し出す
    ///
    /// 会員側の貸出リストには触れない。両側の整合は`Library`が保証する。
    ///
    /// # エラー
    /// 既に貸出中の場合は`BookError::AlreadyBorrowed`
    pub fn borrow(
        &mut self,
        borrower: MemberRef,
        borrowed_at: DateTime<Utc>,
    ) -> Result<BookBorrowed, BookError> {
        if !self.is_available() {
            return Err(BookError::AlreadyBorrowed(self.id));
        }

        self.borrowed = Some(BorrowRecord {
            at: borrowed_at,
            by: borrower.clone(),
        });

        Ok(BookBorrowed {
            book_id: self.id,
            borrowed_by: borrower,
            borrowed_at,
        })
    }

    /// 書籍を返却する
    ///
    /// 返却記録は上書きされ、次の貸出後も保持される。
    ///
    /// # エラー
    /// 貸出中でない場合は`BookError::NotBorrowed`
    pub fn return_book(
        &mut self,
        returner: MemberRef,
        returned_at: DateTime<Utc>,
    ) -> Result<BookReturned, BookError> {
        if self.borrowed.take().is_none() {
            return Err(BookError::NotBorrowed(self.id));
        }

        self.returned = Some(ReturnRecord {
            at: returned_at,
            by: returner.clone(),
        });

        Ok(BookReturned {
            book_id: self.id,
            returned_by: returner,
            returned_at,
        })
    }

    /// 現在の貸出の詳細（貸出中でなければ`None`）
    pub fn borrow_details(&self) -> Option<BorrowDetails> {
        self.borrowed.as_ref().map(|record| BorrowDetails {
            borrowed_at: record.at,
            borrowed_by_name: record.by.name.clone(),
            borrowed_by_id: record.by.id,
        })
    }

    /// 直近の返却の詳細（一度も返却されていなければ`None`）
    pub fn return_details(&self) -> Option<ReturnDetails> {
        self.returned.as_ref().map(|record| ReturnDetails {
            returned_at: record.at,
            returned_by_name: record.by.name.clone(),
            returned_by_id: record.by.id,
        })
    }

    pub fn history(&self) -> BookHistory {
        BookHistory {
            book_id: self.id,
            title: self.title.clone(),
            available: self.is_available(),
            borrow_details: self.borrow_details(),
            return_details: self.return_details(),
        }
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.is_available() {
            "Available"
        } else {
            "Not Available"
        };
        write!(
            f,
            "{} by {} (ID: {}) - {}",
            self.title, self.author, self.id, status
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn book() -> Book {
        Book::new(BookId::new(1).unwrap(), "Test Book", "Test Author", "Fiction").unwrap()
    }

    fn member_ref(id: u32, name: &str) -> MemberRef {
        MemberRef {
            id: MemberId::new(id).unwrap(),
            name: name.to_string(),
        }
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_new_book_is_available() {
        let book = book();
        assert_eq!(book.id().value(), 1);
        assert_eq!(book.title(), "Test Book");
        assert_eq!(book.author(), "Test Author");
        assert_eq!(book.genre(), "Fiction");
        assert!(book.is_available());
        assert!(book.is_available_to_borrow());
        assert!(book.borrow_details().is_none());
        assert!(book.return_details().is_none());
    }

    #[test]
    fn test_new_book_rejects_blank_fields() {
        let id = BookId::new(1).unwrap();
        assert_eq!(
            Book::new(id, "", "Author", "Fiction"),
            Err(ValidationError::EmptyField("title"))
        );
        assert_eq!(
            Book::new(id, "Title", " ", "Fiction"),
            Err(ValidationError::EmptyField("author"))
        );
        assert_eq!(
            Book::new(id, "Title", "Author", ""),
            Err(ValidationError::EmptyField("genre"))
        );
    }

    #[test]
    fn test_borrow_sets_borrower_and_timestamp() {
        let mut book = book();
        let alice = member_ref(1, "Alice");

        let event = book.borrow(alice.clone(), at(9)).unwrap();

        assert!(!book.is_available());
        assert_eq!(book.borrowed_at(), Some(at(9)));
        assert_eq!(book.borrowed_by(), Some(&alice));
        assert_eq!(event.book_id, book.id());
        assert_eq!(event.borrowed_by, alice);
        assert_eq!(event.borrowed_at, at(9));
    }

    #[test]
    fn test_borrow_twice_fails_and_keeps_first_borrower() {
        let mut book = book();
        book.borrow(member_ref(1, "Alice"), at(9)).unwrap();

        let result = book.borrow(member_ref(2, "Bob"), at(10));

        assert_eq!(result, Err(BookError::AlreadyBorrowed(book.id())));
        assert_eq!(book.borrowed_by().unwrap().name, "Alice");
        assert_eq!(book.borrowed_at(), Some(at(9)));
    }

    #[test]
    fn test_return_available_book_fails() {
        let mut book = book();
        let result = book.return_book(member_ref(1, "Alice"), at(9));
        assert_eq!(result, Err(BookError::NotBorrowed(book.id())));
        assert!(book.return_details().is_none());
    }

    #[test]
    fn test_return_clears_borrow_and_records_return() {
        let mut book = book();
        let alice = member_ref(1, "Alice");
        book.borrow(alice.clone(), at(9)).unwrap();

        let event = book.return_book(alice.clone(), at(11)).unwrap();

        assert!(book.is_available());
        assert!(book.borrowed_at().is_none());
        assert!(book.borrowed_by().is_none());
        assert_eq!(book.returned_at(), Some(at(11)));
        assert_eq!(book.returned_by(), Some(&alice));
        assert_eq!(event.returned_at, at(11));
    }

    #[test]
    fn test_return_record_survives_next_borrow() {
        let mut book = book();
        book.borrow(member_ref(1, "Alice"), at(9)).unwrap();
        book.return_book(member_ref(1, "Alice"), at(10)).unwrap();
        book.borrow(member_ref(2, "Bob"), at(11)).unwrap();

        let borrow = book.borrow_details().unwrap();
        let ret = book.return_details().unwrap();

        assert_eq!(borrow.borrowed_by_name, "Bob");
        assert_eq!(borrow.borrowed_at, at(11));
        assert_eq!(ret.returned_by_name, "Alice");
        assert_eq!(ret.returned_by_id.value(), 1);
        assert_eq!(ret.returned_at, at(10));
    }

    #[test]
    fn test_history_after_borrow_and_return() {
        let mut book = book();
        let alice = member_ref(1, "Alice");
        book.borrow(alice.clone(), at(9)).unwrap();
        book.return_book(alice, at(9) + Duration::minutes(30)).unwrap();

        let history = book.history();

        assert_eq!(history.book_id, book.id());
        assert_eq!(history.title, "Test Book");
        assert!(history.available);
        assert!(history.borrow_details.is_none());
        assert!(history.return_details.is_some());
    }

    #[test]
    fn test_display() {
        let mut book = book();
        assert_eq!(
            book.to_string(),
            "Test Book by Test Author (ID: 1) - Available"
        );

        book.borrow(member_ref(1, "Alice"), at(9)).unwrap();
        assert_eq!(
            book.to_string(),
            "Test Book by Test Author (ID: 1) - Not Available"
        );
    }
}
