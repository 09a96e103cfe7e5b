use thiserror::Error;

use super::{BookId, MemberId};

/// 書籍単体の状態遷移エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookError {
    /// 既に貸出中
    #[error("book {0} is already borrowed")]
    AlreadyBorrowed(BookId),

    /// 貸出されていない書籍の返却
    #[error("book {0} is not borrowed")]
    NotBorrowed(BookId),
}

/// 会員単位の貸出・返却エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemberError {
    /// 貸出上限に達している
    #[error("member {member_id} already holds the maximum of {limit} books")]
    BorrowLimitExceeded { member_id: MemberId, limit: usize },

    /// 書籍が貸出不可
    #[error("book {0} is not available for borrowing")]
    BookUnavailable(BookId),

    /// この会員が借りていない書籍
    #[error("member {member_id} does not hold book {book_id}")]
    BookNotHeld { member_id: MemberId, book_id: BookId },
}

/// 生成時のバリデーションエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// IDは正の整数
    #[error("{0} must be a positive integer")]
    InvalidId(&'static str),

    /// 必須項目が空
    #[error("{0} must not be empty")]
    EmptyField(&'static str),
}
