use crate::domain::{Book, BookHistory, BookId, BorrowDetails, Member, MemberId, ReturnDetails};
use indexmap::IndexMap;

use super::errors::{LibraryError, Result};
use super::library_service::Library;

/// 参照系の操作
///
/// 現在の状態を読むだけで、書籍・会員を変更しない。
/// 結果の順序はすべて登録順。
impl Library {
    /// 貸出可能な書籍（ジャンル指定時は完全一致で絞り込む）
    pub fn available_books<'a>(
        &'a self,
        genre: Option<&'a str>,
    ) -> impl Iterator<Item = &'a Book> + 'a {
        self.books_in_genre(genre).filter(|book| book.is_available())
    }

    /// 貸出中の書籍（ジャンル指定時は完全一致で絞り込む）
    pub fn issued_books<'a>(
        &'a self,
        genre: Option<&'a str>,
    ) -> impl Iterator<Item = &'a Book> + 'a {
        self.books_in_genre(genre).filter(|book| !book.is_available())
    }

    fn books_in_genre<'a>(&'a self, genre: Option<&'a str>) -> impl Iterator<Item = &'a Book> + 'a {
        self.books
            .values()
            .filter(move |book| genre.is_none_or(|genre| book.genre() == genre))
    }

    /// 1冊以上借りている会員
    pub fn members_with_borrowed_books(&self) -> impl Iterator<Item = &Member> {
        self.members
            .values()
            .filter(|member| member.borrowed_count() > 0)
    }

    /// タイトルまたは著者にキーワードを含む最初の書籍（大文字小文字を区別しない）
    ///
    /// 空白のみのキーワードは何にも一致しない。
    pub fn search_book(&self, keyword: &str) -> Option<&Book> {
        self.search_books_iter(keyword).next()
    }

    /// タイトルまたは著者にキーワードを含むすべての書籍
    pub fn search_books(&self, keyword: &str) -> Vec<&Book> {
        self.search_books_iter(keyword).collect()
    }

    fn search_books_iter<'a>(&'a self, keyword: &str) -> impl Iterator<Item = &'a Book> + 'a {
        let blank = keyword.trim().is_empty();
        let keyword = keyword.to_lowercase();
        tracing::debug!("Searching books by keyword {:?}", keyword);

        self.books.values().filter(move |book| {
            !blank
                && (book.title().to_lowercase().contains(&keyword)
                    || book.author().to_lowercase().contains(&keyword))
        })
    }

    /// ジャンル別の冊数（最初に現れた順）
    ///
    /// `issued_only`が`true`なら貸出中の書籍だけを数える。
    pub fn books_count_by_genre(&self, issued_only: bool) -> IndexMap<String, usize> {
        self.books
            .values()
            .filter(|book| !issued_only || !book.is_available())
            .fold(IndexMap::new(), |mut counts, book| {
                *counts.entry(book.genre().to_string()).or_insert(0) += 1;
                counts
            })
    }

    /// 貸出中の書籍で最も多いジャンル
    ///
    /// 同数の場合は、登録順に走査して最初に最大数へ達したジャンルを返す。
    /// 貸出中の書籍がなければ`None`。
    pub fn most_popular_genre_from_issued_books(&self) -> Option<String> {
        let max = self.books_count_by_genre(true).into_values().max()?;

        let mut running: IndexMap<&str, usize> = IndexMap::new();
        self.issued_books(None).find_map(|book| {
            let count = running.entry(book.genre()).or_insert(0);
            *count += 1;
            (*count == max).then(|| book.genre().to_string())
        })
    }

    /// 貸出中の書籍で最大数に並ぶすべてのジャンル（最初に現れた順）
    pub fn most_popular_genres_from_issued_books(&self) -> Vec<String> {
        let counts = self.books_count_by_genre(true);
        let Some(max) = counts.values().copied().max() else {
            return Vec::new();
        };

        counts
            .into_iter()
            .filter(|(_, count)| *count == max)
            .map(|(genre, _)| genre)
            .collect()
    }

    pub fn get_book_borrow_details(&self, book_id: BookId) -> Result<Option<BorrowDetails>> {
        Ok(self.registered_book(book_id)?.borrow_details())
    }

    pub fn get_book_return_details(&self, book_id: BookId) -> Result<Option<ReturnDetails>> {
        Ok(self.registered_book(book_id)?.return_details())
    }

    /// 書籍の履歴（ID・タイトル・現在の状態・直近の貸出・直近の返却）
    pub fn get_book_history(&self, book_id: BookId) -> Result<BookHistory> {
        Ok(self.registered_book(book_id)?.history())
    }

    /// 会員の表示用文字列
    ///
    /// 借りている書籍のタイトルは登録簿から引く。登録簿から外された
    /// 書籍はIDで表示する。
    pub fn describe_member(&self, member_id: MemberId) -> Result<String> {
        let member = self
            .member(member_id)
            .ok_or(LibraryError::MemberNotRegistered(member_id))?;

        let titles: Vec<String> = member
            .borrowed_books()
            .map(|book_id| match self.book(book_id) {
                Some(book) => book.title().to_string(),
                None => format!("#{book_id}"),
            })
            .collect();

        Ok(format!(
            "{} (ID: {}) - Borrowed Books: [{}]",
            member.name(),
            member.id(),
            titles.join(", ")
        ))
    }

    fn registered_book(&self, book_id: BookId) -> Result<&Book> {
        self.book(book_id)
            .ok_or(LibraryError::BookNotRegistered(book_id))
    }
}
