//! HTTP and WebSocket handlers.

mod http;
mod websocket;

pub use http::{
    direct_history, direct_inbox, get_rooms, health_check, material_history, post_direct_message,
    post_material_message,
};
pub use websocket::{direct_websocket_handler, material_websocket_handler};

use axum::http::{HeaderMap, StatusCode, header::AUTHORIZATION};

use crate::usecase::ConnectError;

/// Bearer credential of a request: the `token` query parameter, or else the
/// `Authorization: Bearer` header
fn credential(query_token: Option<String>, headers: &HeaderMap) -> Option<String> {
    query_token.filter(|t| !t.is_empty()).or_else(|| {
        headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|token| token.trim().to_string())
            .filter(|t| !t.is_empty())
    })
}

/// HTTP status answering a rejected handshake
fn status_for(e: &ConnectError) -> StatusCode {
    match e {
        ConnectError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
        ConnectError::Forbidden { .. }
        | ConnectError::MaterialNotFound(_)
        | ConnectError::PeerNotFound(_)
        | ConnectError::SelfDirect => StatusCode::FORBIDDEN,
        ConnectError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::VerifyError;
    use axum::http::HeaderValue;

    #[test]
    fn test_credential_prefers_query_token() {
        // テスト項目: クエリの token がヘッダーより優先される
        // given (前提条件):
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));

        // when (操作):
        let from_query = credential(Some("from-query".to_string()), &headers);
        let from_header = credential(None, &headers);
        let empty_query = credential(Some(String::new()), &headers);

        // then (期待する結果):
        assert_eq!(from_query.as_deref(), Some("from-query"));
        assert_eq!(from_header.as_deref(), Some("from-header"));
        assert_eq!(empty_query.as_deref(), Some("from-header"));
    }

    #[test]
    fn test_credential_ignores_other_schemes() {
        // テスト項目: Bearer 以外の Authorization ヘッダーは無視される
        // given (前提条件):
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));

        // when (操作):
        let result = credential(None, &headers);

        // then (期待する結果):
        assert_eq!(result, None);
    }

    #[test]
    fn test_status_for_connect_errors() {
        // テスト項目: ハンドシェイクの拒否理由が HTTP ステータスに対応付けられる
        // when (操作) / then (期待する結果):
        assert_eq!(
            status_for(&ConnectError::Unauthenticated(VerifyError::MissingCredential)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_for(&ConnectError::Forbidden {
                user_id: 1,
                material_id: "m".to_string()
            }),
            StatusCode::FORBIDDEN
        );
        assert_eq!(status_for(&ConnectError::SelfDirect), StatusCode::FORBIDDEN);
        assert_eq!(
            status_for(&ConnectError::Unavailable("db".to_string())),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
