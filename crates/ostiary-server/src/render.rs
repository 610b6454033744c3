//! Renderer seam for the interaction page.

use std::sync::Arc;

use axum::Json;
use axum::response::{IntoResponse, Response};
use ostiary_consent::InteractionPage;
use serde::Serialize;

/// Produces the interaction page from its presentation model.
pub trait Renderer: Send + Sync {
    /// Render `page`; the page's form must post to `decision_path`.
    fn render_interaction(&self, page: &InteractionPage, decision_path: &str) -> Response;
}

/// A renderer that can be shared across handlers.
pub type SharedRenderer = Arc<dyn Renderer>;

/// Returns the presentation model as JSON for a front end to render.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InteractionView<'a> {
    #[serde(flatten)]
    page: &'a InteractionPage,
    decision_path: &'a str,
}

impl Renderer for JsonRenderer {
    fn render_interaction(&self, page: &InteractionPage, decision_path: &str) -> Response {
        Json(InteractionView {
            page,
            decision_path,
        })
        .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    #[tokio::test]
    async fn test_json_renderer() {
        let page = InteractionPage {
            login_required: true,
            login_id: "john".into(),
            login_id_fixed: true,
            display_name: None,
            claims: vec!["email".into()],
            client: None,
            scopes: vec![],
        };

        let response = JsonRenderer.render_interaction(&page, "/decide");
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let view: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(view["loginRequired"], json!(true));
        assert_eq!(view["loginId"], json!("john"));
        assert_eq!(view["loginIdFixed"], json!(true));
        assert_eq!(view["claims"], json!(["email"]));
        assert_eq!(view["decisionPath"], json!("/decide"));
    }
}
