use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, book_borrow_details, book_history, book_return_details, genre_counts, get_book,
    get_member, issue_book, list_books, list_members, members_with_loans, popular_genre,
    register_books, register_members, remove_book, remove_member, return_book, search_books,
};

/// Creates the API router with all library endpoints
///
/// Registry:
/// - GET/POST /books, GET/DELETE /books/:id
/// - GET/POST /members, GET/DELETE /members/:id
///
/// Lending:
/// - POST /loans - Issue a book to a member
/// - POST /loans/return - Return a book
///
/// Queries:
/// - GET /books/:id/borrow-details, /books/:id/return-details, /books/:id/history
/// - GET /search
/// - GET /reports/members-with-loans, /reports/genres, /reports/popular-genre
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        // Registry
        .route("/books", get(list_books).post(register_books))
        .route("/books/:id", get(get_book).delete(remove_book))
        .route("/books/:id/borrow-details", get(book_borrow_details))
        .route("/books/:id/return-details", get(book_return_details))
        .route("/books/:id/history", get(book_history))
        .route("/members", get(list_members).post(register_members))
        .route("/members/:id", get(get_member).delete(remove_member))
        // Lending
        .route("/loans", post(issue_book))
        .route("/loans/return", post(return_book))
        // Queries
        .route("/search", get(search_books))
        .route("/reports/members-with-loans", get(members_with_loans))
        .route("/reports/genres", get(genre_counts))
        .route("/reports/popular-genre", get(popular_genre))
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add application state
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
