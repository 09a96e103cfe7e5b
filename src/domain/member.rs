use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use super::{
    BORROW_LIMIT, Book, BookBorrowed, BookId, BookReturned, MemberError, MemberId,
    MemberRef, ValidationError, value_objects::require_non_blank,
};

/// 会員エンティティ
///
/// 不変条件：`borrowed_books.len() <= BORROW_LIMIT`
///
/// 借りている書籍はIDのみで参照する（非所有）。挿入順を保持する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    id: MemberId,
    name: String,
    age: u16,
    contact_info: String,
    borrowed_books: IndexSet<BookId>,
}

impl Member {
    /// 新しい会員を作成する
    ///
    /// # エラー
    /// 名前・連絡先が空の場合は`ValidationError::EmptyField`
    pub fn new(
        id: MemberId,
        name: impl Into<String>,
        age: u16,
        contact_info: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            id,
            name: require_non_blank("name", name)?,
            age,
            contact_info: require_non_blank("contact_info", contact_info)?,
            borrowed_books: IndexSet::new(),
        })
    }

    pub fn id(&self) -> MemberId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn age(&self) -> u16 {
        self.age
    }

    pub fn contact_info(&self) -> &str {
        &self.contact_info
    }

    /// 貸出中の書籍ID（貸出順）
    pub fn borrowed_books(&self) -> impl Iterator<Item = BookId> + '_ {
        self.borrowed_books.iter().copied()
    }

    pub fn borrowed_count(&self) -> usize {
        self.borrowed_books.len()
    }

    pub fn holds(&self, book_id: BookId) -> bool {
        self.borrowed_books.contains(&book_id)
    }

    pub fn can_borrow_more(&self) -> bool {
        self.borrowed_books.len() < BORROW_LIMIT
    }

    /// 書籍側に記録する参照
    pub fn member_ref(&self) -> MemberRef {
        MemberRef {
            id: self.id,
            name: self.name.clone(),
        }
    }

    /// 会員が書籍を借りる
    ///
    /// 書籍の状態も同時に変更する。図書館経由の`Library::issue_book`が
    /// 正規の経路で、こちらは登録状況を確認しない簡易な入口。
    ///
    /// # エラー
    /// - 上限に達している場合は`MemberError::BorrowLimitExceeded`
    /// - 書籍が貸出中の場合は`MemberError::BookUnavailable`
    pub fn borrow_book(
        &mut self,
        book: &mut Book,
        borrowed_at: DateTime<Utc>,
    ) -> Result<BookBorrowed, MemberError> {
        if !self.can_borrow_more() {
            return Err(MemberError::BorrowLimitExceeded {
                member_id: self.id,
                limit: BORROW_LIMIT,
            });
        }

        let book_id = book.id();
        let event = book
            .borrow(self.member_ref(), borrowed_at)
            .map_err(|_| MemberError::BookUnavailable(book_id))?;

        self.borrowed_books.insert(book_id);
        Ok(event)
    }

    /// 会員が書籍を返却する
    ///
    /// # エラー
    /// この会員が借りていない書籍の場合は`MemberError::BookNotHeld`
    pub fn return_book(
        &mut self,
        book: &mut Book,
        returned_at: DateTime<Utc>,
    ) -> Result<BookReturned, MemberError> {
        if !self.holds(book.id()) {
            return Err(MemberError::BookNotHeld {
                member_id: self.id,
                book_id: book.id(),
            });
        }

        let (member_id, book_id) = (self.id, book.id());
        let event = book
            .return_book(self.member_ref(), returned_at)
            .map_err(|_| MemberError::BookNotHeld { member_id, book_id })?;

        self.borrowed_books.shift_remove(&book_id);
        Ok(event)
    }
}
