use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use powerblockade_domain::{DomainError, Node};
use subtle::ConstantTimeEq;

/// Bearer header carrying the node API key.
pub const NODE_KEY_HEADER: &str = "X-PowerBlockade-Node-Key";

/// Extractor for sync-protocol endpoints: resolves the calling node from
/// its API key or rejects with 401.
///
/// The presented key is compared against every node row in constant time;
/// a SQL `WHERE api_key = ?` would leak match position through timing.
pub struct AuthedNode(pub Node);

fn keys_match(candidate: &str, presented: &str) -> bool {
    let a = candidate.as_bytes();
    let b = presented.as_bytes();
    if a.len() != b.len() {
        // Burn an equivalent compare so length mismatch costs the same.
        let _ = a.ct_eq(a);
        return false;
    }
    a.ct_eq(b).into()
}

impl FromRequestParts<AppState> for AuthedNode {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let presented = parts
            .headers
            .get(NODE_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .ok_or(ApiError(DomainError::AuthMissing))?;

        let mut matched: Option<Node> = None;
        for node in state.nodes.get_all().await.map_err(ApiError)? {
            if keys_match(&node.api_key, presented) {
                matched = Some(node);
            }
        }

        matched
            .map(AuthedNode)
            .ok_or(ApiError(DomainError::AuthInvalid))
    }
}

/// Marker inserted by the external session layer for operator endpoints.
/// Without a session middleware in front, those endpoints answer 401.
#[derive(Debug, Clone, Copy)]
pub struct SessionUser(pub i64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_keys_match() {
        assert!(keys_match("abcdef", "abcdef"));
    }

    #[test]
    fn wrong_or_shorter_keys_do_not() {
        assert!(!keys_match("abcdef", "abcdeg"));
        assert!(!keys_match("abcdef", "abc"));
        assert!(!keys_match("abcdef", ""));
    }
}
