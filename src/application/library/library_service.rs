use crate::adapters::system::SystemClock;
use crate::domain::{BORROW_LIMIT, Book, BookBorrowed, BookId, BookReturned, Member, MemberId};
use crate::ports::Clock;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

use super::errors::{LibraryError, Result};

/// 図書館サービス
///
/// 書籍と会員の登録簿を持ち、貸出関係を変更できる唯一の窓口。
/// 登録簿は登録順を保持する（検索・集計の順序はこの順に従う）。
///
/// 書籍と会員は互いをIDで参照するだけで、所有関係はない。
/// 両側の整合は`issue_book`と`return_book`だけが保証する。
pub struct Library {
    pub(super) books: IndexMap<BookId, Book>,
    pub(super) members: IndexMap<MemberId, Member>,
    clock: Arc<dyn Clock>,
}

impl Library {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            books: IndexMap::new(),
            members: IndexMap::new(),
            clock,
        }
    }

    // ========================================================================
    // 登録簿
    // ========================================================================

    /// 書籍を登録する
    ///
    /// 同じIDの書籍が既に登録されている場合は何もせず`false`を返す。
    /// ID の一意性は呼び出し側の責任。
    pub fn add_book(&mut self, book: Book) -> bool {
        let book_id = book.id();
        if self.books.contains_key(&book_id) {
            tracing::warn!("Book {} is already registered; ignoring duplicate", book_id);
            return false;
        }

        tracing::info!(%book_id, title = book.title(), "Book registered");
        self.books.insert(book_id, book);
        true
    }

    /// 複数の書籍をまとめて登録する。新たに登録された件数を返す
    pub fn add_books(&mut self, books: impl IntoIterator<Item = Book>) -> usize {
        books
            .into_iter()
            .map(|book| self.add_book(book))
            .filter(|added| *added)
            .count()
    }

    /// 書籍を登録簿から外す
    ///
    /// 貸出中でも返却処理は行わない（在庫管理の操作であり貸出操作ではない）。
    /// 借りている会員の側には書籍IDが残る。
    pub fn remove_book(&mut self, book_id: BookId) -> Option<Book> {
        let book = self.books.shift_remove(&book_id)?;
        match book.borrowed_by() {
            Some(borrower) => tracing::warn!(
                "Book {} removed while on loan to member {}",
                book_id,
                borrower.id
            ),
            None => tracing::info!(%book_id, "Book removed"),
        }
        Some(book)
    }

    /// 会員を登録する
    ///
    /// 同じIDの会員が既に登録されている場合は何もせず`false`を返す。
    pub fn add_member(&mut self, member: Member) -> bool {
        let member_id = member.id();
        if self.members.contains_key(&member_id) {
            tracing::warn!(
                "Member {} is already registered; ignoring duplicate",
                member_id
            );
            return false;
        }

        tracing::info!(%member_id, name = member.name(), "Member registered");
        self.members.insert(member_id, member);
        true
    }

    pub fn add_members(&mut self, members: impl IntoIterator<Item = Member>) -> usize {
        members
            .into_iter()
            .map(|member| self.add_member(member))
            .filter(|added| *added)
            .count()
    }

    /// 会員を登録簿から外す
    ///
    /// 借りている書籍は貸出中のまま残る。
    pub fn remove_member(&mut self, member_id: MemberId) -> Option<Member> {
        let member = self.members.shift_remove(&member_id)?;
        if member.borrowed_count() > 0 {
            tracing::warn!(
                "Member {} removed while holding {} book(s)",
                member_id,
                member.borrowed_count()
            );
        } else {
            tracing::info!(%member_id, "Member removed");
        }
        Some(member)
    }

    pub fn book(&self, book_id: BookId) -> Option<&Book> {
        self.books.get(&book_id)
    }

    pub fn member(&self, member_id: MemberId) -> Option<&Member> {
        self.members.get(&member_id)
    }

    /// 登録順の書籍一覧
    pub fn books(&self) -> impl Iterator<Item = &Book> {
        self.books.values()
    }

    /// 登録順の会員一覧
    pub fn members(&self) -> impl Iterator<Item = &Member> {
        self.members.values()
    }

    // ========================================================================
    // 貸出・返却
    // ========================================================================

    /// 書籍を会員に貸し出す
    ///
    /// 事前条件（この順に検査する）：
    /// 1. 書籍が登録されていること
    /// 2. 会員が登録されていること
    /// 3. 書籍が貸出可能であること
    /// 4. 会員の貸出中の冊数が上限未満であること
    ///
    /// 書籍と会員の両方を一度に更新する。いずれかの条件を満たさない場合は
    /// どちらも変更しない。
    pub fn issue_book(&mut self, book_id: BookId, member_id: MemberId) -> Result<BookBorrowed> {
        let book = self
            .books
            .get_mut(&book_id)
            .ok_or(LibraryError::BookNotRegistered(book_id))?;
        let member = self
            .members
            .get_mut(&member_id)
            .ok_or(LibraryError::MemberNotRegistered(member_id))?;

        if !book.is_available() {
            tracing::warn!(
                "Cannot issue book {} to member {}: already on loan",
                book_id,
                member_id
            );
            return Err(LibraryError::BookUnavailable(book_id));
        }

        if !member.can_borrow_more() {
            tracing::warn!(
                "Cannot issue book {} to member {}: borrow limit reached",
                book_id,
                member_id
            );
            return Err(LibraryError::BorrowLimitExceeded {
                member_id,
                limit: BORROW_LIMIT,
            });
        }

        let event = member.borrow_book(book, self.clock.now())?;

        tracing::info!(
            "Book issued: book_id={}, member_id={}, borrowed_at={}",
            book_id,
            member_id,
            event.borrowed_at
        );

        Ok(event)
    }

    /// 貸し出した書籍を返却する
    ///
    /// 事前条件：
    /// 1. 書籍が登録されていること
    /// 2. 会員が登録されていること
    /// 3. 書籍がこの会員に貸し出されていること
    ///
    /// 貸出可能な書籍、または別の会員に貸出中の書籍は
    /// `BookNotBorrowedByMember`で拒否する。
    pub fn return_book(&mut self, book_id: BookId, member_id: MemberId) -> Result<BookReturned> {
        let book = self
            .books
            .get_mut(&book_id)
            .ok_or(LibraryError::BookNotRegistered(book_id))?;
        let member = self
            .members
            .get_mut(&member_id)
            .ok_or(LibraryError::MemberNotRegistered(member_id))?;

        let borrowed_by_member = book
            .borrowed_by()
            .is_some_and(|borrower| borrower.id == member_id);

        if !borrowed_by_member || !member.holds(book_id) {
            tracing::warn!(
                "Cannot return book {} from member {}: not borrowed by this member",
                book_id,
                member_id
            );
            return Err(LibraryError::BookNotBorrowedByMember { book_id, member_id });
        }

        let event = member.return_book(book, self.clock.now())?;

        tracing::info!(
            "Book returned: book_id={}, member_id={}, returned_at={}",
            book_id,
            member_id,
            event.returned_at
        );

        Ok(event)
    }
}

impl Default for Library {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock::new()))
    }
}

impl fmt::Debug for Library {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Library")
            .field("books", &self.books)
            .field("members", &self.members)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::ManualClock;
    use chrono::Duration;

    fn book_id(id: u32) -> BookId {
        BookId::new(id).unwrap()
    }

    fn member_id(id: u32) -> MemberId {
        MemberId::new(id).unwrap()
    }

    fn book(id: u32, genre: &str) -> Book {
        Book::new(book_id(id), format!("Book {id}"), "Author", genre).unwrap()
    }

    fn member(id: u32) -> Member {
        Member::new(
            member_id(id),
            format!("Member {id}"),
            30,
            format!("member{id}@example.com"),
        )
        .unwrap()
    }

    fn setup() -> (Library, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        let mut library = Library::new(clock.clone());
        library.add_books((1..=7).map(|id| book(id, "Fiction")));
        library.add_members([member(1), member(2)]);
        (library, clock)
    }

    /// 登録されたすべての書籍・会員について貸出関係が双方向で一致しているか
    fn assert_consistent(library: &Library) {
        for book in library.books() {
            assert_eq!(book.is_available(), book.borrowed_at().is_none());
            assert_eq!(book.is_available(), book.borrowed_by().is_none());
            if let Some(borrower) = book.borrowed_by() {
                if let Some(member) = library.member(borrower.id) {
                    assert!(member.holds(book.id()));
                }
            }
        }
        for member in library.members() {
            assert!(member.borrowed_count() <= BORROW_LIMIT);
            for held in member.borrowed_books() {
                if let Some(book) = library.book(held) {
                    assert_eq!(book.borrowed_by().map(|b| b.id), Some(member.id()));
                }
            }
        }
    }

    #[test]
    fn test_add_book_ignores_duplicate_id() {
        let (mut library, _) = setup();

        let added = library.add_book(book(1, "Mystery"));

        assert!(!added);
        assert_eq!(library.books().count(), 7);
        assert_eq!(library.book(book_id(1)).unwrap().genre(), "Fiction");
    }

    #[test]
    fn test_add_books_counts_new_entries() {
        let (mut library, _) = setup();
        let added = library.add_books([book(7, "Fiction"), book(8, "Fiction"), book(9, "Fiction")]);
        assert_eq!(added, 2);
    }

    #[test]
    fn test_remove_book_and_member() {
        let (mut library, _) = setup();

        assert!(library.remove_book(book_id(3)).is_some());
        assert!(library.remove_book(book_id(3)).is_none());
        assert!(library.remove_member(member_id(2)).is_some());

        assert!(library.book(book_id(3)).is_none());
        assert!(library.member(member_id(2)).is_none());
        let ids: Vec<u32> = library.books().map(|b| b.id().value()).collect();
        assert_eq!(ids, vec![1, 2, 4, 5, 6, 7]);
    }

    #[test]
    fn test_issue_book_updates_both_sides() {
        let (mut library, clock) = setup();
        let issued_at = clock.now();

        let event = library.issue_book(book_id(1), member_id(1)).unwrap();

        let book = library.book(book_id(1)).unwrap();
        assert!(!book.is_available());
        assert_eq!(book.borrowed_at(), Some(issued_at));
        assert_eq!(book.borrowed_by().unwrap().id, member_id(1));
        assert!(library.member(member_id(1)).unwrap().holds(book_id(1)));
        assert_eq!(event.borrowed_at, issued_at);
        assert_consistent(&library);
    }

    #[test]
    fn test_issue_unregistered_book_fails() {
        let (mut library, _) = setup();
        let result = library.issue_book(book_id(99), member_id(1));
        assert_eq!(result, Err(LibraryError::BookNotRegistered(book_id(99))));
    }

    #[test]
    fn test_issue_to_unregistered_member_fails_without_side_effects() {
        let (mut library, _) = setup();

        let result = library.issue_book(book_id(1), member_id(99));

        assert_eq!(result, Err(LibraryError::MemberNotRegistered(member_id(99))));
        assert!(library.book(book_id(1)).unwrap().is_available());
    }

    #[test]
    fn test_issue_twice_keeps_first_borrower() {
        let (mut library, clock) = setup();
        library.issue_book(book_id(1), member_id(1)).unwrap();
        clock.advance(Duration::minutes(1));

        let result = library.issue_book(book_id(1), member_id(2));

        assert_eq!(result, Err(LibraryError::BookUnavailable(book_id(1))));
        let book = library.book(book_id(1)).unwrap();
        assert_eq!(book.borrowed_by().unwrap().id, member_id(1));
        assert_eq!(library.member(member_id(2)).unwrap().borrowed_count(), 0);
    }

    #[test]
    fn test_unavailable_is_reported_before_borrow_limit() {
        let (mut library, _) = setup();
        for id in 1..=5 {
            library.issue_book(book_id(id), member_id(1)).unwrap();
        }
        library.issue_book(book_id(6), member_id(2)).unwrap();

        let result = library.issue_book(book_id(6), member_id(1));

        assert_eq!(result, Err(LibraryError::BookUnavailable(book_id(6))));
    }

    #[test]
    fn test_sixth_issue_exceeds_borrow_limit() {
        let (mut library, _) = setup();
        for id in 1..=5 {
            library.issue_book(book_id(id), member_id(1)).unwrap();
        }

        let result = library.issue_book(book_id(6), member_id(1));

        assert_eq!(
            result,
            Err(LibraryError::BorrowLimitExceeded {
                member_id: member_id(1),
                limit: BORROW_LIMIT,
            })
        );
        assert_eq!(library.member(member_id(1)).unwrap().borrowed_count(), 5);
        assert!(library.book(book_id(6)).unwrap().is_available());
        assert_consistent(&library);
    }

    #[test]
    fn test_return_book_updates_both_sides() {
        let (mut library, clock) = setup();
        library.issue_book(book_id(1), member_id(1)).unwrap();
        clock.advance(Duration::hours(2));
        let returned_at = clock.now();

        let event = library.return_book(book_id(1), member_id(1)).unwrap();

        let book = library.book(book_id(1)).unwrap();
        assert!(book.is_available());
        assert_eq!(book.returned_at(), Some(returned_at));
        assert_eq!(book.returned_by().unwrap().id, member_id(1));
        assert!(!library.member(member_id(1)).unwrap().holds(book_id(1)));
        assert_eq!(event.returned_at, returned_at);
        assert_consistent(&library);
    }

    #[test]
    fn test_return_by_other_member_fails() {
        let (mut library, _) = setup();
        library.issue_book(book_id(1), member_id(1)).unwrap();

        let result = library.return_book(book_id(1), member_id(2));

        assert_eq!(
            result,
            Err(LibraryError::BookNotBorrowedByMember {
                book_id: book_id(1),
                member_id: member_id(2),
            })
        );
        assert!(!library.book(book_id(1)).unwrap().is_available());
        assert!(library.member(member_id(1)).unwrap().holds(book_id(1)));
    }

    #[test]
    fn test_return_available_book_fails() {
        let (mut library, _) = setup();

        let result = library.return_book(book_id(1), member_id(1));

        assert_eq!(
            result,
            Err(LibraryError::BookNotBorrowedByMember {
                book_id: book_id(1),
                member_id: member_id(1),
            })
        );
        assert!(library.book(book_id(1)).unwrap().return_details().is_none());
    }

    #[test]
    fn test_removed_book_cannot_be_returned() {
        let (mut library, _) = setup();
        library.issue_book(book_id(1), member_id(1)).unwrap();

        let removed = library.remove_book(book_id(1)).unwrap();

        assert!(!removed.is_available());
        assert!(library.member(member_id(1)).unwrap().holds(book_id(1)));
        assert_eq!(
            library.return_book(book_id(1), member_id(1)),
            Err(LibraryError::BookNotRegistered(book_id(1)))
        );
    }

    #[test]
    fn test_state_stays_consistent_across_mixed_operations() {
        let (mut library, clock) = setup();
        let operations: [(bool, u32, u32); 12] = [
            (true, 1, 1),
            (true, 2, 1),
            (true, 1, 2),
            (false, 1, 2),
            (true, 3, 2),
            (false, 1, 1),
            (true, 1, 2),
            (false, 3, 1),
            (false, 3, 2),
            (true, 3, 1),
            (false, 2, 1),
            (false, 2, 1),
        ];

        for (issue, book, member) in operations {
            clock.advance(Duration::seconds(1));
            let _ = if issue {
                library.issue_book(book_id(book), member_id(member)).map(|_| ())
            } else {
                library.return_book(book_id(book), member_id(member)).map(|_| ())
            };
            assert_consistent(&library);
        }

        assert_eq!(
            library.book(book_id(1)).unwrap().borrowed_by().unwrap().id,
            member_id(2)
        );
        assert_eq!(
            library.book(book_id(3)).unwrap().borrowed_by().unwrap().id,
            member_id(1)
        );
        assert!(library.book(book_id(2)).unwrap().is_available());
    }
}
