use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::{Book, BookId, Member, MemberId, ValidationError};

/// 1件または複数件を受け付けるリクエストボディ
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }
}

/// 書籍登録リクエスト（POST /books）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterBookRequest {
    pub id: u32,
    pub title: String,
    pub author: String,
    pub genre: String,
}

impl TryFrom<RegisterBookRequest> for Book {
    type Error = ValidationError;

    fn try_from(req: RegisterBookRequest) -> Result<Self, Self::Error> {
        Book::new(BookId::new(req.id)?, req.title, req.author, req.genre)
    }
}

/// 会員登録リクエスト（POST /members）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterMemberRequest {
    pub id: u32,
    pub name: String,
    pub age: u16,
    pub contact_info: String,
}

impl TryFrom<RegisterMemberRequest> for Member {
    type Error = ValidationError;

    fn try_from(req: RegisterMemberRequest) -> Result<Self, Self::Error> {
        Member::new(MemberId::new(req.id)?, req.name, req.age, req.contact_info)
    }
}

/// 登録結果
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisteredResponse {
    /// 新たに登録された件数（重複IDは数えない）
    pub registered: usize,
}

/// 貸出・返却リクエスト（POST /loans, POST /loans/return）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanRequest {
    pub book_id: BookId,
    pub member_id: MemberId,
}

/// 書籍一覧のクエリパラメータ
#[derive(Debug, Default, Deserialize)]
pub struct ListBooksQuery {
    /// ジャンルでフィルタリング（完全一致）
    pub genre: Option<String>,
    /// "available" または "issued"
    pub status: Option<String>,
}

/// 書籍一覧のステータスフィルタ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookStatusFilter {
    Available,
    Issued,
}

impl FromStr for BookStatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(BookStatusFilter::Available),
            "issued" => Ok(BookStatusFilter::Issued),
            other => Err(format!(
                "Invalid status filter: {other} (expected \"available\" or \"issued\")"
            )),
        }
    }
}

/// 検索のクエリパラメータ
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub keyword: String,
    /// trueならすべての一致を返す
    #[serde(default)]
    pub all: bool,
}

/// ジャンル集計のクエリパラメータ
#[derive(Debug, Default, Deserialize)]
pub struct GenreCountQuery {
    #[serde(default)]
    pub issued_only: bool,
}

/// 書籍レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct BookResponse {
    pub id: u32,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub available: bool,
    pub borrowed_by_id: Option<u32>,
}

impl From<&Book> for BookResponse {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id().value(),
            title: book.title().to_string(),
            author: book.author().to_string(),
            genre: book.genre().to_string(),
            available: book.is_available(),
            borrowed_by_id: book.borrowed_by().map(|borrower| borrower.id.value()),
        }
    }
}

/// 会員レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct MemberResponse {
    pub id: u32,
    pub name: String,
    pub age: u16,
    pub contact_info: String,
    pub borrowed_books: Vec<u32>,
}

impl From<&Member> for MemberResponse {
    fn from(member: &Member) -> Self {
        Self {
            id: member.id().value(),
            name: member.name().to_string(),
            age: member.age(),
            contact_info: member.contact_info().to_string(),
            borrowed_books: member.borrowed_books().map(|id| id.value()).collect(),
        }
    }
}

/// ジャンル別冊数
#[derive(Debug, Serialize, Deserialize)]
pub struct GenreCount {
    pub genre: String,
    pub count: usize,
}

/// 最も多く貸し出されているジャンル
#[derive(Debug, Serialize, Deserialize)]
pub struct PopularGenreResponse {
    /// 同数の場合は最初に最大数へ達したジャンル
    pub genre: Option<String>,
    /// 最大数に並ぶすべてのジャンル
    pub tied: Vec<String>,
}

/// エラーレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}
