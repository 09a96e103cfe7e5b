use thiserror::Error;

use crate::domain::{BookId, MemberError, MemberId};

/// 図書館サービスのエラー
///
/// すべて呼び出し側の入力に起因する検証エラーで、再試行しても結果は変わらない。
/// エラー時は書籍・会員のどちらの状態も変更されていない。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LibraryError {
    /// 書籍が登録されていない
    #[error("book {0} is not registered in the library")]
    BookNotRegistered(BookId),

    /// 会員が登録されていない
    #[error("member {0} is not registered in the library")]
    MemberNotRegistered(MemberId),

    /// 書籍が貸出中
    #[error("book {0} is not available for borrowing")]
    BookUnavailable(BookId),

    /// 貸出上限（5冊）に達している
    #[error("member {member_id} already holds the maximum of {limit} books")]
    BorrowLimitExceeded { member_id: MemberId, limit: usize },

    /// この会員に貸し出されていない書籍の返却
    #[error("book {book_id} is not borrowed by member {member_id}")]
    BookNotBorrowedByMember { book_id: BookId, member_id: MemberId },
}

/// 図書館サービスの Result型
pub type Result<T> = std::result::Result<T, LibraryError>;

impl From<MemberError> for LibraryError {
    fn from(err: MemberError) -> Self {
        match err {
            MemberError::BorrowLimitExceeded { member_id, limit } => {
                LibraryError::BorrowLimitExceeded { member_id, limit }
            }
            MemberError::BookUnavailable(book_id) => LibraryError::BookUnavailable(book_id),
            MemberError::BookNotHeld { member_id, book_id } => {
                LibraryError::BookNotBorrowedByMember { book_id, member_id }
            }
        }
    }
}
