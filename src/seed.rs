//! デモ用のサンプルデータ
//!
//! 書籍21冊・会員7名を登録し、貸出・返却の一連の操作を実行する。
//! 意図的に失敗する操作（貸出中の書籍の貸出、借りていない書籍の返却）を
//! 含むため、拒否された操作は中断せずに記録して返す。

use crate::application::library::{Library, LibraryError};
use crate::domain::{Book, BookId, Member, MemberId, ValidationError};

const SAMPLE_BOOKS: [(u32, &str, &str, &str); 21] = [
    (1, "The Great Gatsby", "F. Scott Fitzgerald", "Fiction"),
    (2, "To Kill a Mockingbird", "Harper Lee", "Fiction"),
    (3, "The Catcher in the Rye", "J.D. Salinger", "Fiction"),
    (4, "War and Peace", "Leo Tolstoy", "Fiction"),
    (5, "Pride and Prejudice", "Jane Austen", "Fiction"),
    (6, "The Fault in Our Stars", "John Green", "Fiction"),
    (7, "Brave New World", "Aldous Huxley", "Dystopian"),
    (8, "Fahrenheit 451", "Ray Bradbury", "Dystopian"),
    (9, "The Hunger Games", "Suzanne Collins", "Dystopian"),
    (10, "The Handmaid's Tale", "Margaret Atwood", "Dystopian"),
    (11, "The Road", "Cormac McCarthy", "Dystopian"),
    (12, "The Hobbit", "J.R.R. Tolkien", "Fantasy"),
    (13, "The Lord of the Rings", "J.R.R. Tolkien", "Fantasy"),
    (14, "The Chronicles of Narnia", "C.S. Lewis", "Fantasy"),
    (15, "Moby Dick", "Herman Melville", "Adventure"),
    (16, "The Alchemist", "Paulo Coelho", "Adventure"),
    (17, "The Odyssey", "Homer", "Adventure"),
    (18, "The Da Vinci Code", "Dan Brown", "Thriller"),
    (19, "The Shining", "Stephen King", "Thriller"),
    (20, "The Girl with the Dragon Tattoo", "Stieg Larsson", "Mystery"),
    (21, "Art in 1984", "George Orwell", "Literature"),
];

const SAMPLE_MEMBERS: [(u32, &str, u16, &str); 7] = [
    (1, "Alice", 30, "alice@example.com"),
    (2, "Bob", 25, "bob@example.com"),
    (3, "Charlie", 35, "charlie@example.com"),
    (4, "David", 28, "david@example.com"),
    (5, "Eve", 22, "eve@example.com"),
    (6, "Frank", 40, "frank@example.com"),
    (7, "Grace", 27, "grace@example.com"),
];

/// (書籍ID, 会員ID)
const SAMPLE_ISSUES: [(u32, u32); 14] = [
    (1, 1),
    (2, 1),
    (3, 2),
    (4, 3),
    (5, 4),
    (6, 5),
    (7, 6),
    (8, 6),
    (9, 1),
    (10, 2),
    (20, 3),
    (21, 5),
    // 貸出中の書籍
    (1, 4),
    (3, 1),
];

const SAMPLE_RETURNS: [(u32, u32); 6] = [
    (1, 1),
    (3, 2),
    (5, 4),
    (10, 2),
    // 借りていない書籍
    (11, 7),
    (15, 2),
];

/// サンプルデータ投入の結果
#[derive(Debug, Default)]
pub struct SeedReport {
    pub books_registered: usize,
    pub members_registered: usize,
    pub issued: usize,
    pub returned: usize,
    pub rejected: Vec<LibraryError>,
}

pub fn sample_books() -> Result<Vec<Book>, ValidationError> {
    SAMPLE_BOOKS
        .iter()
        .map(|(id, title, author, genre)| Book::new(BookId::new(*id)?, *title, *author, *genre))
        .collect()
}

pub fn sample_members() -> Result<Vec<Member>, ValidationError> {
    SAMPLE_MEMBERS
        .iter()
        .map(|(id, name, age, contact)| Member::new(MemberId::new(*id)?, *name, *age, *contact))
        .collect()
}

/// サンプルデータを登録し、貸出・返却のシナリオを実行する
pub fn seed_library(library: &mut Library) -> Result<SeedReport, ValidationError> {
    let mut report = SeedReport {
        books_registered: library.add_books(sample_books()?),
        members_registered: library.add_members(sample_members()?),
        ..SeedReport::default()
    };

    tracing::info!("================== Issuing Books ==================");
    for (book, member) in SAMPLE_ISSUES {
        match library.issue_book(BookId::new(book)?, MemberId::new(member)?) {
            Ok(_) => report.issued += 1,
            Err(err) => report.rejected.push(err),
        }
    }

    tracing::info!("================== Returning Books ==================");
    for (book, member) in SAMPLE_RETURNS {
        match library.return_book(BookId::new(book)?, MemberId::new(member)?) {
            Ok(_) => report.returned += 1,
            Err(err) => report.rejected.push(err),
        }
    }

    for err in &report.rejected {
        tracing::warn!("Sample operation rejected: {}", err);
    }

    Ok(report)
}

/// 図書館の現在の状態をログに出力する
pub fn log_summary(library: &Library) {
    tracing::info!("================== Members with borrowed books ==================");
    for member in library.members_with_borrowed_books() {
        if let Ok(description) = library.describe_member(member.id()) {
            tracing::info!("{}", description);
        }
    }

    tracing::info!("================== Books currently issued ==================");
    for book in library.issued_books(None) {
        tracing::info!("{}", book);
    }

    tracing::info!("================== Books currently available ==================");
    for book in library.available_books(None) {
        tracing::info!("{}", book);
    }

    for genre in ["Fiction", "Dystopian"] {
        tracing::info!("Available {} books: {}", genre, library.available_books(Some(genre)).count());
    }

    for keyword in ["the", "tolkien", "kill"] {
        match library.search_book(keyword) {
            Some(book) => tracing::info!("Search {:?}: {}", keyword, book),
            None => tracing::info!("Search {:?}: no books found", keyword),
        }
    }

    for (genre, count) in library.books_count_by_genre(false) {
        tracing::info!("Books in {}: {}", genre, count);
    }

    for (genre, count) in library.books_count_by_genre(true) {
        tracing::info!("Issued books in {}: {}", genre, count);
    }

    match library.most_popular_genre_from_issued_books() {
        Some(genre) => tracing::info!("Most popular genre amongst issued books: {}", genre),
        None => tracing::info!("No issued books to determine most popular genre"),
    }
}
