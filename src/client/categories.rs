//! Category groups for site navigation.
//!
//! The group list is two-phase: the backend's slug index first, then every
//! group fetched concurrently. A group that fails is left out of the result
//! instead of failing the whole listing.

use std::collections::BTreeMap;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::client::taxonomy::{
    category_color, category_icon, display_order, is_main_category_group, normalize_category_slug, parent_group,
};
use crate::error::GatewayError;
use crate::http::response::decode_backend_json;
use crate::http::server::AppState;
use crate::resilience::RetryPolicy;
use crate::upstream::{endpoint, forward_headers, segment_endpoint, BackendRequest, ForwardBody};

/// `GET /api/category-groups/slugs` payload.
#[derive(Debug, Deserialize)]
struct SlugIndex {
    #[serde(default)]
    success: bool,
    slugs: Option<Vec<String>>,
}

/// `GET /api/category-groups/{slug}` payload.
#[derive(Debug, Deserialize)]
struct GroupEnvelope {
    #[serde(default)]
    success: bool,
    group: Option<BackendGroup>,
}

#[derive(Debug, Deserialize)]
struct BackendGroup {
    slug: String,
    name: String,
    icon: Option<String>,
    description: Option<String>,
    color: Option<String>,
    #[serde(default)]
    categories: Vec<Value>,
}

/// A category group as served to the site. Leaf categories are passed
/// through untouched.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoryGroup {
    pub title: String,
    pub icon: String,
    pub description: Option<String>,
    #[serde(rename = "mainSlug")]
    pub main_slug: String,
    pub slug: String,
    pub color: String,
    pub order: i64,
    pub categories: Vec<Value>,
}

impl From<BackendGroup> for CategoryGroup {
    fn from(group: BackendGroup) -> Self {
        let icon = group.icon.unwrap_or_else(|| category_icon(&group.slug).to_string());
        let color = group.color.unwrap_or_else(|| category_color(&group.slug).to_string());
        Self {
            title: group.name,
            icon,
            description: group.description,
            main_slug: group.slug.clone(),
            order: display_order(&group.slug),
            slug: group.slug,
            color,
            categories: group.categories,
        }
    }
}

fn listing_failure(message: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "success": false,
            "message": message,
            "groups": {},
        })),
    )
        .into_response()
}

/// `GET /api/client/categories`
pub async fn list_groups(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let base = state.backend_url();
    let forwarded = forward_headers(&headers, ForwardBody::Json);
    let policy = state.read_policy();

    let request = BackendRequest::new(Method::GET, endpoint(&base, "/api/category-groups/slugs"))
        .headers(forwarded.clone());
    let response = match state.call_backend(request, &policy).await {
        Ok(response) if response.status.is_success() => response,
        Ok(response) => {
            tracing::error!(status = %response.status, "Failed to fetch group slugs");
            return listing_failure("Failed to fetch category groups");
        }
        Err(err) => {
            tracing::error!(error = %err, "Failed to fetch group slugs");
            return listing_failure(&err.to_string());
        }
    };

    let slugs = match decode_backend_json(&response).map(serde_json::from_value::<SlugIndex>) {
        Ok(Ok(SlugIndex { success: true, slugs: Some(slugs) })) => slugs,
        _ => {
            tracing::error!("Invalid slugs data");
            return listing_failure("Invalid slugs data");
        }
    };

    let fetches = slugs.iter().map(|slug| {
        let request = BackendRequest::new(Method::GET, segment_endpoint(&base, "/api/category-groups", slug))
            .headers(forwarded.clone());
        fetch_group(&state, request, slug, &policy)
    });
    let groups: BTreeMap<String, CategoryGroup> = join_all(fetches)
        .await
        .into_iter()
        .flatten()
        .map(|group| (group.slug.clone(), group))
        .collect();

    tracing::info!(requested = slugs.len(), returned = groups.len(), "Category groups aggregated");

    Json(json!({
        "success": true,
        "total_groups": groups.len(),
        "groups": groups,
    }))
    .into_response()
}

/// One group, or `None` if it could not be fetched or decoded.
async fn fetch_group(
    state: &AppState,
    request: BackendRequest,
    slug: &str,
    policy: &RetryPolicy,
) -> Option<CategoryGroup> {
    let response = match state.call_backend(request, policy).await {
        Ok(response) if response.status.is_success() => response,
        Ok(response) => {
            tracing::warn!(slug, status = %response.status, "Failed to fetch group");
            return None;
        }
        Err(err) => {
            tracing::warn!(slug, error = %err, "Failed to fetch group");
            return None;
        }
    };

    match decode_backend_json(&response).map(serde_json::from_value::<GroupEnvelope>) {
        Ok(Ok(GroupEnvelope { success: true, group: Some(group) })) => Some(group.into()),
        _ => {
            tracing::warn!(slug, "Invalid data for group");
            None
        }
    }
}

/// `GET /api/client/categories/{slug}`. Leaf slugs resolve to their group.
pub async fn get_group(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    headers: HeaderMap,
) -> Result<Response, GatewayError> {
    let normalized = normalize_category_slug(&slug);
    if normalized.is_empty() {
        return Err(GatewayError::invalid("Valid category slug is required"));
    }
    let group_slug = if is_main_category_group(&normalized) {
        normalized
    } else {
        parent_group(&normalized).map(str::to_string).unwrap_or(normalized)
    };

    let url = segment_endpoint(&state.backend_url(), "/api/category-groups", &group_slug);
    let request = BackendRequest::new(Method::GET, url).headers(forward_headers(&headers, ForwardBody::Json));
    let response = state.call_backend(request, &state.read_policy()).await?;

    let body = decode_backend_json(&response)?;
    if !response.status.is_success() {
        return Err(GatewayError::Backend {
            status: response.status,
            body,
        });
    }

    match serde_json::from_value::<GroupEnvelope>(body) {
        Ok(GroupEnvelope { success: true, group: Some(group) }) => Ok(Json(json!({
            "success": true,
            "group": CategoryGroup::from(group),
        }))
        .into_response()),
        _ => Err(GatewayError::NotFound(format!("Category group '{group_slug}' not found"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{gateway, json_body, BACKEND};
    use crate::upstream::transport::mock::{MockOutcome, MockTransport};
    use axum::body::Body;
    use axum::http::Request;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn group(slug: &str, name: &str) -> Value {
        json!({
            "success": true,
            "group": {
                "slug": slug,
                "name": name,
                "categories": [{"category_id": 4, "name": "Football", "slug": "football", "parent_id": null}],
            }
        })
    }

    #[test]
    fn test_group_shape_fills_taxonomy_defaults() {
        let backend: GroupEnvelope = serde_json::from_value(group("sports", "Sports")).unwrap();
        let group = CategoryGroup::from(backend.group.unwrap());
        let value = serde_json::to_value(&group).unwrap();

        assert_eq!(value["title"], "Sports");
        assert_eq!(value["mainSlug"], "sports");
        assert_eq!(value["icon"], "⚽");
        assert_eq!(value["color"], "#f39c12");
        assert_eq!(value["order"], 4);
        assert_eq!(value["categories"][0]["slug"], "football");
    }

    #[tokio::test]
    async fn test_listing_excludes_failed_groups() {
        let transport = Arc::new(MockTransport::new(vec![
            MockOutcome::json(200, json!({"success": true, "slugs": ["world", "broken"]})),
            MockOutcome::json(200, group("world", "World")),
            MockOutcome::json(404, json!({"success": false})),
        ]));

        let response = gateway(transport.clone())
            .oneshot(Request::get("/api/client/categories").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["total_groups"], 1);
        assert_eq!(body["groups"]["world"]["order"], 0);
        assert!(body["groups"].get("broken").is_none());
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test]
    async fn test_listing_fails_when_slug_index_is_invalid() {
        let transport = Arc::new(MockTransport::always(MockOutcome::json(200, json!({"success": false}))));

        let response = gateway(transport.clone())
            .oneshot(Request::get("/api/client/categories").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["message"], "Invalid slugs data");
        assert_eq!(body["groups"], json!({}));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_leaf_slug_resolves_to_parent_group() {
        let transport = Arc::new(MockTransport::always(MockOutcome::json(200, group("sports", "Sports"))));

        let response = gateway(transport.clone())
            .oneshot(Request::get("/api/client/categories/Football").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(transport.requests()[0].url, format!("{BACKEND}/api/category-groups/sports"));
        assert_eq!(json_body(response).await["group"]["slug"], "sports");
    }

    #[tokio::test]
    async fn test_unknown_group_relays_backend_404() {
        let transport = Arc::new(MockTransport::always(MockOutcome::json(
            404,
            json!({"success": false, "message": "Group not found"}),
        )));

        let response = gateway(transport)
            .oneshot(Request::get("/api/client/categories/nowhere").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["message"], "Group not found");
    }

    #[tokio::test]
    async fn test_leaf_fields_are_not_enforced() {
        let transport = Arc::new(MockTransport::new(vec![
            MockOutcome::json(200, json!({"success": true, "slugs": ["sports"]})),
            MockOutcome::json(
                200,
                json!({
                    "success": true,
                    "group": {
                        "slug": "sports",
                        "name": "Sports",
                        "categories": [{"category_id": 7, "name": null}],
                    }
                }),
            ),
        ]));

        let response = gateway(transport)
            .oneshot(Request::get("/api/client/categories").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let body = json_body(response).await;
        assert_eq!(body["total_groups"], 1);
        assert_eq!(body["groups"]["sports"]["categories"][0], json!({"category_id": 7, "name": null}));
    }

    #[tokio::test]
    async fn test_backend_slugs_are_encoded_as_one_path_segment() {
        let transport = Arc::new(MockTransport::new(vec![
            MockOutcome::json(200, json!({"success": true, "slugs": ["a/b?c#d"]})),
            MockOutcome::json(404, json!({"success": false})),
        ]));

        gateway(transport.clone())
            .oneshot(Request::get("/api/client/categories").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(
            transport.requests()[1].url,
            format!("{BACKEND}/api/category-groups/a%2Fb%3Fc%23d")
        );
    }
}
