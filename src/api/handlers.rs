use crate::application::library::{Library, LibraryError};
use crate::domain::{
    Book, BookHistory, BookId, BorrowDetails, DomainEvent, Member, MemberId, ReturnDetails,
};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use std::sync::{Arc, Mutex, MutexGuard};

use super::{
    error::ApiError,
    extract::{AppJson, AppPath, AppQuery},
    types::{
        BookResponse, BookStatusFilter, GenreCount, GenreCountQuery, ListBooksQuery, LoanRequest,
        MemberResponse, OneOrMany, PopularGenreResponse, RegisterBookRequest,
        RegisterMemberRequest, RegisteredResponse, SearchQuery,
    },
};

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
///
/// 図書館1つにつきロック1つ。貸出・返却の両側更新はこのロックの内側で
/// 一度に行われる。
pub struct AppState {
    library: Mutex<Library>,
}

impl AppState {
    pub fn new(library: Library) -> Self {
        Self {
            library: Mutex::new(library),
        }
    }

    pub fn library(&self) -> Result<MutexGuard<'_, Library>, ApiError> {
        self.library.lock().map_err(|_| ApiError::StatePoisoned)
    }
}

fn parse_book_id(raw: u32) -> Result<BookId, ApiError> {
    Ok(BookId::new(raw)?)
}

fn parse_member_id(raw: u32) -> Result<MemberId, ApiError> {
    Ok(MemberId::new(raw)?)
}

// ============================================================================
// Books
// ============================================================================

/// POST /books - 書籍を登録（1件または配列）
///
/// 1件でも不正な書籍があれば何も登録しない。
pub async fn register_books(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<OneOrMany<RegisterBookRequest>>,
) -> Result<(StatusCode, Json<RegisteredResponse>), ApiError> {
    let books = req
        .into_vec()
        .into_iter()
        .map(Book::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    let registered = state.library()?.add_books(books);

    Ok((StatusCode::CREATED, Json(RegisteredResponse { registered })))
}

/// GET /books - 書籍一覧
///
/// `status=available|issued` と `genre` で絞り込める。
pub async fn list_books(
    State(state): State<Arc<AppState>>,
    AppQuery(query): AppQuery<ListBooksQuery>,
) -> Result<Json<Vec<BookResponse>>, ApiError> {
    let status = query
        .status
        .as_deref()
        .map(str::parse::<BookStatusFilter>)
        .transpose()
        .map_err(ApiError::BadRequest)?;
    let genre = query.genre.as_deref();

    let library = state.library()?;
    let books: Vec<BookResponse> = match status {
        Some(BookStatusFilter::Available) => {
            library.available_books(genre).map(BookResponse::from).collect()
        }
        Some(BookStatusFilter::Issued) => {
            library.issued_books(genre).map(BookResponse::from).collect()
        }
        None => library
            .books()
            .filter(|book| genre.is_none_or(|genre| book.genre() == genre))
            .map(BookResponse::from)
            .collect(),
    };

    Ok(Json(books))
}

/// GET /books/:id - 書籍を取得
pub async fn get_book(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<u32>,
) -> Result<Json<BookResponse>, ApiError> {
    let book_id = parse_book_id(id)?;
    let library = state.library()?;
    let book = library
        .book(book_id)
        .ok_or(LibraryError::BookNotRegistered(book_id))?;

    Ok(Json(BookResponse::from(book)))
}

/// DELETE /books/:id - 書籍を登録簿から外す
///
/// 貸出中でも返却処理は行わない。
pub async fn remove_book(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<u32>,
) -> Result<Json<BookResponse>, ApiError> {
    let book_id = parse_book_id(id)?;
    let removed = state
        .library()?
        .remove_book(book_id)
        .ok_or(LibraryError::BookNotRegistered(book_id))?;

    Ok(Json(BookResponse::from(&removed)))
}

/// GET /books/:id/borrow-details - 現在の貸出の詳細（貸出中でなければnull）
pub async fn book_borrow_details(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<u32>,
) -> Result<Json<Option<BorrowDetails>>, ApiError> {
    let book_id = parse_book_id(id)?;
    Ok(Json(state.library()?.get_book_borrow_details(book_id)?))
}

/// GET /books/:id/return-details - 直近の返却の詳細（返却記録がなければnull）
pub async fn book_return_details(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<u32>,
) -> Result<Json<Option<ReturnDetails>>, ApiError> {
    let book_id = parse_book_id(id)?;
    Ok(Json(state.library()?.get_book_return_details(book_id)?))
}

/// GET /books/:id/history - 書籍の履歴
pub async fn book_history(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<u32>,
) -> Result<Json<BookHistory>, ApiError> {
    let book_id = parse_book_id(id)?;
    Ok(Json(state.library()?.get_book_history(book_id)?))
}

/// GET /search?keyword=...&all=true - タイトル・著者で検索
///
/// `all`を指定しない場合は最初の1件のみ（見つからなければ空配列）。
pub async fn search_books(
    State(state): State<Arc<AppState>>,
    AppQuery(query): AppQuery<SearchQuery>,
) -> Result<Json<Vec<BookResponse>>, ApiError> {
    let library = state.library()?;
    let books: Vec<BookResponse> = if query.all {
        library
            .search_books(&query.keyword)
            .into_iter()
            .map(BookResponse::from)
            .collect()
    } else {
        library
            .search_book(&query.keyword)
            .map(BookResponse::from)
            .into_iter()
            .collect()
    };

    Ok(Json(books))
}

// ============================================================================
// Members
// ============================================================================

/// POST /members - 会員を登録（1件または配列）
pub async fn register_members(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<OneOrMany<RegisterMemberRequest>>,
) -> Result<(StatusCode, Json<RegisteredResponse>), ApiError> {
    let members = req
        .into_vec()
        .into_iter()
        .map(Member::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    let registered = state.library()?.add_members(members);

    Ok((StatusCode::CREATED, Json(RegisteredResponse { registered })))
}

/// GET /members - 会員一覧
pub async fn list_members(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<MemberResponse>>, ApiError> {
    let library = state.library()?;
    Ok(Json(library.members().map(MemberResponse::from).collect()))
}

/// GET /members/:id
pub async fn get_member(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<u32>,
) -> Result<Json<MemberResponse>, ApiError> {
    let member_id = parse_member_id(id)?;
    let library = state.library()?;
    let member = library
        .member(member_id)
        .ok_or(LibraryError::MemberNotRegistered(member_id))?;

    Ok(Json(MemberResponse::from(member)))
}

/// DELETE /members/:id - 会員を登録簿から外す
///
/// 借りている書籍は貸出中のまま残る。
pub async fn remove_member(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<u32>,
) -> Result<Json<MemberResponse>, ApiError> {
    let member_id = parse_member_id(id)?;
    let removed = state
        .library()?
        .remove_member(member_id)
        .ok_or(LibraryError::MemberNotRegistered(member_id))?;

    Ok(Json(MemberResponse::from(&removed)))
}

// ============================================================================
// Loans
// ============================================================================

/// POST /loans - 書籍を貸し出す
///
/// 強制されるビジネスルール:
/// - 書籍・会員が登録されていること
/// - 書籍が貸出可能であること
/// - 会員の貸出数が上限（5冊）未満であること
pub async fn issue_book(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<LoanRequest>,
) -> Result<(StatusCode, Json<DomainEvent>), ApiError> {
    let event = state.library()?.issue_book(req.book_id, req.member_id)?;
    Ok((StatusCode::CREATED, Json(event.into())))
}

/// POST /loans/return - 書籍を返却する
///
/// 書籍がこの会員に貸し出されている場合のみ受け付ける。
pub async fn return_book(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<LoanRequest>,
) -> Result<Json<DomainEvent>, ApiError> {
    let event = state.library()?.return_book(req.book_id, req.member_id)?;
    Ok(Json(event.into()))
}

// ============================================================================
// Reports
// ============================================================================

/// GET /reports/members-with-loans - 貸出中の書籍がある会員
pub async fn members_with_loans(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<MemberResponse>>, ApiError> {
    let library = state.library()?;
    Ok(Json(
        library
            .members_with_borrowed_books()
            .map(MemberResponse::from)
            .collect(),
    ))
}

/// GET /reports/genres?issued_only=true - ジャンル別冊数
pub async fn genre_counts(
    State(state): State<Arc<AppState>>,
    AppQuery(query): AppQuery<GenreCountQuery>,
) -> Result<Json<Vec<GenreCount>>, ApiError> {
    let counts = state.library()?.books_count_by_genre(query.issued_only);
    Ok(Json(
        counts
            .into_iter()
            .map(|(genre, count)| GenreCount { genre, count })
            .collect(),
    ))
}

/// GET /reports/popular-genre - 貸出中の書籍で最も多いジャンル
pub async fn popular_genre(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PopularGenreResponse>, ApiError> {
    let library = state.library()?;
    Ok(Json(PopularGenreResponse {
        genre: library.most_popular_genre_from_issued_books(),
        tied: library.most_popular_genres_from_issued_books(),
    }))
}
