// Opaque cursor pagination over the tenant-scoped user listing. Cursors are
// base64url (no padding) of the canonical JSON form of the sort key; the
// server re-applies the tenant filter, so a forged cursor cannot escape the
// tenant sandbox.
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

pub const DEFAULT_LIMIT: i64 = 50;
pub const MAX_LIMIT: i64 = 1000;

/// Position in the `(email, id)` ascending sort order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorKey {
    pub email: String,
    pub id: Uuid,
}

pub fn encode_cursor(key: &CursorKey) -> String {
    // serialization of a two-field struct cannot fail
    let json = serde_json::to_vec(key).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(json)
}

/// Decode an opaque cursor. Trailing padding and malformed payloads are
/// rejected as `invalid`.
pub fn decode_cursor(raw: &str) -> Result<CursorKey, AppError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(raw)
        .map_err(|e| AppError::wrap(crate::error::ErrorKind::Invalid, "invalid cursor", e))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| AppError::wrap(crate::error::ErrorKind::Invalid, "invalid cursor", e))
}

/// Clamp a requested page size to [1, 1000], defaulting to 50
pub fn clamp_limit(requested: Option<i64>) -> i64 {
    requested.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_more: bool,
    pub next_cursor: Option<String>,
}

/// Assemble a page from a `limit+1` overfetch. When more rows came back than
/// requested the page is trimmed and the next cursor points at the last
/// retained row; otherwise `has_more` is false and the cursor is a convenience
/// only.
pub fn assemble<T, F>(mut rows: Vec<T>, limit: usize, key: F) -> Page<T>
where
    F: Fn(&T) -> CursorKey,
{
    let has_more = rows.len() > limit;
    if has_more {
        rows.truncate(limit);
    }
    let next_cursor = rows.last().map(|row| encode_cursor(&key(row)));
    Page {
        items: rows,
        has_more,
        next_cursor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn key(email: &str) -> CursorKey {
        CursorKey {
            email: email.to_string(),
            id: Uuid::new_v4(),
        }
    }

    #[test]
    fn cursor_round_trip() {
        let original = key("a@x.com");
        let decoded = decode_cursor(&encode_cursor(&original)).expect("decode");
        assert_eq!(decoded, original);
    }

    #[test]
    fn cursor_rejects_padding_and_garbage() {
        let padded = format!("{}==", encode_cursor(&key("a@x.com")));
        assert_eq!(decode_cursor(&padded).expect_err("padding").kind(), ErrorKind::Invalid);
        assert_eq!(decode_cursor("@@@").expect_err("garbage").kind(), ErrorKind::Invalid);
        // valid base64url, not a cursor payload
        let bogus = URL_SAFE_NO_PAD.encode(b"[1,2,3]");
        assert_eq!(decode_cursor(&bogus).expect_err("shape").kind(), ErrorKind::Invalid);
    }

    #[test]
    fn limit_is_clamped() {
        assert_eq!(clamp_limit(None), 50);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(-7)), 1);
        assert_eq!(clamp_limit(Some(3)), 3);
        assert_eq!(clamp_limit(Some(10_000)), 1000);
    }

    #[test]
    fn assemble_trims_overfetch_and_flags_more() {
        let rows: Vec<CursorKey> = (0..4).map(|i| key(&format!("u{i}@x.com"))).collect();
        let page = assemble(rows.clone(), 3, Clone::clone);
        assert_eq!(page.items.len(), 3);
        assert!(page.has_more);
        assert_eq!(
            page.next_cursor.as_deref(),
            Some(encode_cursor(&rows[2]).as_str())
        );
    }

    #[test]
    fn assemble_exact_page_is_terminal() {
        let rows: Vec<CursorKey> = (0..2).map(|i| key(&format!("u{i}@x.com"))).collect();
        let page = assemble(rows, 3, Clone::clone);
        assert_eq!(page.items.len(), 2);
        assert!(!page.has_more);
        assert!(page.next_cursor.is_some());
    }

    #[test]
    fn assemble_empty_set() {
        let page = assemble(Vec::<CursorKey>::new(), 3, Clone::clone);
        assert!(page.items.is_empty());
        assert!(!page.has_more);
        assert!(page.next_cursor.is_none());
    }

    /// Iterating pages over a stable sorted set must visit each row exactly
    /// once, in order, for any limit, mirroring the `limit+1` repo query.
    #[test]
    fn paging_is_monotonic_and_exhaustive() {
        let mut all: Vec<CursorKey> = (0..7).map(|i| key(&format!("u{i}@x.com"))).collect();
        all.sort_by(|a, b| (&a.email, a.id).cmp(&(&b.email, b.id)));

        for limit in 1..=8usize {
            let mut cursor: Option<CursorKey> = None;
            let mut seen: Vec<CursorKey> = Vec::new();
            loop {
                let rows: Vec<CursorKey> = all
                    .iter()
                    .filter(|row| match &cursor {
                        Some(c) => (&row.email, row.id) > (&c.email, c.id),
                        None => true,
                    })
                    .take(limit + 1)
                    .cloned()
                    .collect();
                let page = assemble(rows, limit, Clone::clone);
                seen.extend(page.items.iter().cloned());
                assert!(seen.as_slice() == &all[..seen.len()], "pages form a sorted prefix");
                if !page.has_more {
                    break;
                }
                let next = page.next_cursor.as_deref().expect("cursor while has_more");
                cursor = Some(decode_cursor(next).expect("valid cursor"));
            }
            assert_eq!(seen, all, "limit {limit} must exhaust the set");
        }
    }
}
