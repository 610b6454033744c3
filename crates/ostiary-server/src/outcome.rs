//! Mapping engine outcomes onto HTTP responses.

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use ostiary_engine::{EndpointAction, EndpointResponse, EngineOutcome, OutcomeAction};

use crate::error::{Result, ServerError};

const JSON_UTF8: &str = "application/json;charset=UTF-8";
const HTML_UTF8: &str = "text/html;charset=UTF-8";

/// Turn the engine's final answer into the response for the user agent.
///
/// | action | response |
/// |---|---|
/// | `LOCATION` | 302, `Location: <content>` |
/// | `FORM` | 200, HTML body |
/// | `BAD_REQUEST` | 400, JSON body |
/// | `INTERNAL_SERVER_ERROR` | 500, JSON body |
pub fn outcome_response(outcome: EngineOutcome) -> Result<Response> {
    let content = outcome.response_content.unwrap_or_default();

    let response = match outcome.action {
        OutcomeAction::Location => {
            if content.is_empty() {
                return Err(ServerError::Internal(
                    "engine returned an empty redirect location".to_string(),
                ));
            }
            let location = HeaderValue::from_str(&content).map_err(|_| {
                ServerError::Internal("engine returned an unusable redirect location".to_string())
            })?;
            (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
        }
        OutcomeAction::Form => with_body(StatusCode::OK, HTML_UTF8, content),
        OutcomeAction::BadRequest => with_body(StatusCode::BAD_REQUEST, JSON_UTF8, content),
        OutcomeAction::InternalServerError => {
            with_body(StatusCode::INTERNAL_SERVER_ERROR, JSON_UTF8, content)
        }
    };

    Ok(no_store(response))
}

/// Turn the engine's answer for a client-facing endpoint into the response.
///
/// | action | response |
/// |---|---|
/// | `OK` | 200 |
/// | `BAD_REQUEST` | 400 |
/// | `INVALID_CLIENT` | 401, `WWW-Authenticate: Basic realm="<realm>"` |
/// | `INTERNAL_SERVER_ERROR`, `INVALID_TICKET` | 500 |
///
/// Bodies are the engine's JSON. An unresolved `PASSWORD` verdict is an error.
pub fn endpoint_response(response: EndpointResponse, realm: &str) -> Result<Response> {
    let content = response.response_content.unwrap_or_default();

    let response = match response.action {
        EndpointAction::Ok => with_body(StatusCode::OK, JSON_UTF8, content),
        EndpointAction::BadRequest => with_body(StatusCode::BAD_REQUEST, JSON_UTF8, content),
        EndpointAction::InvalidClient => {
            unauthorized(with_body(StatusCode::UNAUTHORIZED, JSON_UTF8, content), realm)
        }
        EndpointAction::InternalServerError | EndpointAction::InvalidTicket => {
            with_body(StatusCode::INTERNAL_SERVER_ERROR, JSON_UTF8, content)
        }
        EndpointAction::Password => {
            return Err(ServerError::Internal(
                "password grant reached the response mapper unresolved".to_string(),
            ));
        }
    };

    Ok(no_store(response))
}

/// Add a Basic challenge for `realm` to a 401 response.
pub fn unauthorized(mut response: Response, realm: &str) -> Response {
    if let Ok(challenge) = HeaderValue::from_str(&format!("Basic realm=\"{}\"", realm)) {
        response
            .headers_mut()
            .insert(header::WWW_AUTHENTICATE, challenge);
    }
    response
}

fn with_body(status: StatusCode, content_type: &'static str, body: String) -> Response {
    (status, [(header::CONTENT_TYPE, content_type)], body).into_response()
}

/// Forbid caching of a response.
pub fn no_store(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(action: OutcomeAction, content: &str) -> EngineOutcome {
        EngineOutcome {
            action,
            response_content: Some(content.to_string()),
            result_message: String::new(),
        }
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_location() {
        let response = outcome_response(outcome(
            OutcomeAction::Location,
            "https://client.example.org/cb?code=abc&state=xyz",
        ))
        .unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers()[header::LOCATION],
            "https://client.example.org/cb?code=abc&state=xyz"
        );
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
        assert_eq!(response.headers()[header::PRAGMA], "no-cache");
    }

    #[tokio::test]
    async fn test_form() {
        let response =
            outcome_response(outcome(OutcomeAction::Form, "<html><form></form></html>")).unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], HTML_UTF8);
        assert_eq!(body_text(response).await, "<html><form></form></html>");
    }

    #[tokio::test]
    async fn test_error_actions() {
        let bad = outcome_response(outcome(
            OutcomeAction::BadRequest,
            "{\"error\":\"invalid_request\"}",
        ))
        .unwrap();
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
        assert_eq!(bad.headers()[header::CONTENT_TYPE], JSON_UTF8);
        assert_eq!(body_text(bad).await, "{\"error\":\"invalid_request\"}");

        let internal =
            outcome_response(outcome(OutcomeAction::InternalServerError, "{}")).unwrap();
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(internal.headers()[header::CACHE_CONTROL], "no-store");
    }

    #[tokio::test]
    async fn test_endpoint_ok() {
        let response = endpoint_response(
            EndpointResponse::new(EndpointAction::Ok, Some("{\"active\":false}".into())),
            "/api/introspection",
        )
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], JSON_UTF8);
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
        assert_eq!(body_text(response).await, "{\"active\":false}");
    }

    #[test]
    fn test_endpoint_invalid_client_challenges() {
        let response = endpoint_response(
            EndpointResponse::new(EndpointAction::InvalidClient, None),
            "/api/token",
        )
        .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers()[header::WWW_AUTHENTICATE],
            "Basic realm=\"/api/token\""
        );
    }

    #[test]
    fn test_endpoint_error_actions() {
        let status = |action| {
            endpoint_response(EndpointResponse::new(action, None), "r")
                .unwrap()
                .status()
        };
        assert_eq!(status(EndpointAction::BadRequest), StatusCode::BAD_REQUEST);
        assert_eq!(status(EndpointAction::InvalidTicket), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            status(EndpointAction::InternalServerError),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert!(
            endpoint_response(EndpointResponse::new(EndpointAction::Password, None), "r").is_err()
        );
    }

    #[test]
    fn test_location_must_be_usable() {
        assert!(outcome_response(outcome(OutcomeAction::Location, "")).is_err());
        assert!(outcome_response(outcome(OutcomeAction::Location, "bad\nvalue")).is_err());
    }
}
