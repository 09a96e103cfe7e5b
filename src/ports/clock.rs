use chrono::{DateTime, Utc};

/// 時計ポート
///
/// 貸出・返却の時刻を供給する。連続した呼び出しで時刻が
/// 巻き戻らないこと（単調非減少）を実装側が保証する。
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
