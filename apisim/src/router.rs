//! Request routing: auth gate, path/method matching and store operations.

use std::sync::Arc;

use anyhow::Result;
use http::{HeaderMap, Method, StatusCode};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::request::RequestDescriptor;
use crate::response::Response;
use crate::store::UserStore;

static USER_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/users/(user_\d+)$").expect("valid user path pattern"));

const DEFAULT_LIMIT: i64 = 20;
const DEFAULT_OFFSET: i64 = 0;

/// Dispatches normalized requests against the single store instance.
///
/// Each dispatch is a pure function of (descriptor, store state) followed by
/// whatever mutation the matched operation implies. The store lock is held
/// across the whole dispatch with no suspension points, so operations are
/// atomic with respect to interleaved simulated calls.
pub struct Router {
    store: Arc<Mutex<UserStore>>,
    api_key: String,
}

impl Router {
    pub fn new(store: Arc<Mutex<UserStore>>, api_key: impl Into<String>) -> Self {
        Self {
            store,
            api_key: api_key.into(),
        }
    }

    /// Handle to the store this router mutates.
    pub fn store(&self) -> Arc<Mutex<UserStore>> {
        self.store.clone()
    }

    /// Route one request to a response.
    ///
    /// API-level failures come back as error responses; a malformed JSON body
    /// on POST/PUT is not converted into a response and instead propagates as
    /// a fault to the transport's caller.
    pub fn dispatch(&self, request: &RequestDescriptor) -> Result<Response> {
        // The auth gate runs before any matching, unknown endpoints included.
        let expected = format!("Bearer {}", self.api_key);
        if request.authorization.as_deref() != Some(expected.as_str()) {
            warn!(
                "Rejected {} {} without a valid credential",
                request.method, request.path
            );
            return Ok(ApiError::Authentication.into_response());
        }

        let mut store = self.store.lock();

        if request.method == Method::GET && request.path == "/users" {
            let limit = query_int(request.query("limit"), DEFAULT_LIMIT);
            let offset = query_int(request.query("offset"), DEFAULT_OFFSET);
            let page = store.list(offset.max(0) as usize, limit.max(0) as usize);
            debug!("Listing {} user(s), has_more={}", page.data.len(), page.has_more);
            return Ok(Response::build(
                Some(&serde_json::to_value(page)?),
                StatusCode::OK,
                HeaderMap::new(),
            ));
        }

        let user_id = USER_PATH
            .captures(&request.path)
            .map(|captures| captures[1].to_string());

        if request.method == Method::GET {
            if let Some(id) = &user_id {
                return Ok(match store.get(id) {
                    Ok(user) => Response::build(
                        Some(&serde_json::to_value(user)?),
                        StatusCode::OK,
                        HeaderMap::new(),
                    ),
                    Err(error) => error.into_response(),
                });
            }
        }

        if request.method == Method::POST && request.path == "/users" {
            let fields: Value = serde_json::from_str(request.body.as_deref().unwrap_or_default())?;
            return Ok(match store.create(&fields) {
                Ok(user) => {
                    debug!("Created {}", user.id);
                    Response::build(
                        Some(&serde_json::to_value(user)?),
                        StatusCode::CREATED,
                        HeaderMap::new(),
                    )
                }
                Err(error) => error.into_response(),
            });
        }

        if request.method == Method::PUT {
            if let Some(id) = &user_id {
                // Existence is checked before the body is parsed, so an
                // unknown id answers 404 even with a malformed body.
                if let Err(error) = store.get(id) {
                    return Ok(error.into_response());
                }
                let patch: Value =
                    serde_json::from_str(request.body.as_deref().unwrap_or_default())?;
                let merged = store.update(id, &patch)?;
                return Ok(Response::build(
                    Some(&serde_json::to_value(merged)?),
                    StatusCode::OK,
                    HeaderMap::new(),
                ));
            }
        }

        if request.method == Method::DELETE {
            if let Some(id) = &user_id {
                return Ok(match store.delete(id) {
                    Ok(()) => {
                        debug!("Deleted {id}");
                        Response::build(None, StatusCode::NO_CONTENT, HeaderMap::new())
                    }
                    Err(error) => error.into_response(),
                });
            }
        }

        Ok(ApiError::UnknownEndpoint.into_response())
    }
}

/// Parse a numeric query parameter, falling back to the default when the
/// value is missing or not an integer.
fn query_int(value: Option<&str>, default: i64) -> i64 {
    value
        .and_then(|value| value.parse::<i64>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::RequestOptions;
    use serde_json::json;
    use url::Url;

    const API_KEY: &str = "websim_dev_key";

    fn router() -> Router {
        Router::new(Arc::new(Mutex::new(UserStore::seeded())), API_KEY)
    }

    fn request(method: Method, url: &str, options: RequestOptions) -> RequestDescriptor {
        let url = Url::parse(url).unwrap();
        RequestDescriptor::from_parts(&url, &options.method(method), "/v1")
    }

    fn body_json(response: &Response) -> Value {
        serde_json::from_str(response.text()).unwrap()
    }

    #[test]
    fn auth_requires_exact_bearer_value() {
        let router = router();
        for options in [
            RequestOptions::default(),
            RequestOptions::default().bearer("wrong_key"),
            RequestOptions::default().bearer("websim_dev_key "),
        ] {
            let response = router
                .dispatch(&request(
                    Method::GET,
                    "https://api.websim.dev/v1/users",
                    options,
                ))
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(body_json(&response)["error"]["type"], "authentication_error");
        }
    }

    #[test]
    fn auth_gate_covers_unknown_endpoints() {
        let router = router();
        let response = router
            .dispatch(&request(
                Method::GET,
                "https://api.websim.dev/v1/nowhere",
                RequestOptions::default(),
            ))
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn unknown_endpoint_payload_is_generic() {
        let router = router();
        let response = router
            .dispatch(&request(
                Method::GET,
                "https://api.websim.dev/v1/teams",
                RequestOptions::default().bearer(API_KEY),
            ))
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let payload = body_json(&response);
        assert_eq!(payload["error"]["message"], "Endpoint not found");
        assert!(payload["error"].get("type").is_none());
    }

    #[test]
    fn id_pattern_must_match_exactly() {
        let router = router();
        // Not `user_<digits>`, so this is an unmatched endpoint.
        let response = router
            .dispatch(&request(
                Method::GET,
                "https://api.websim.dev/v1/users/alice",
                RequestOptions::default().bearer(API_KEY),
            ))
            .unwrap();
        assert_eq!(body_json(&response)["error"]["message"], "Endpoint not found");
    }

    #[test]
    fn listing_defaults_and_bad_numbers_fall_back() {
        let router = router();
        let response = router
            .dispatch(&request(
                Method::GET,
                "https://api.websim.dev/v1/users?limit=abc&offset=-3",
                RequestOptions::default().bearer(API_KEY),
            ))
            .unwrap();

        let payload = body_json(&response);
        assert_eq!(payload["data"].as_array().unwrap().len(), 2);
        assert_eq!(payload["has_more"], false);
    }

    #[test]
    fn malformed_body_propagates_as_fault() {
        let router = router();
        let result = router.dispatch(&request(
            Method::POST,
            "https://api.websim.dev/v1/users",
            RequestOptions::default().bearer(API_KEY).json_body("{not json"),
        ));
        assert!(result.is_err());

        // A missing body behaves the same way.
        let result = router.dispatch(&request(
            Method::POST,
            "https://api.websim.dev/v1/users",
            RequestOptions::default().bearer(API_KEY),
        ));
        assert!(result.is_err());
    }

    #[test]
    fn put_answers_not_found_before_parsing_the_body() {
        let router = router();
        let response = router
            .dispatch(&request(
                Method::PUT,
                "https://api.websim.dev/v1/users/user_999",
                RequestOptions::default().bearer(API_KEY).json_body("{not json"),
            ))
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(&response)["error"]["message"],
            "No such user: user_999"
        );
    }

    #[test]
    fn delete_returns_no_content() {
        let router = router();
        let response = router
            .dispatch(&request(
                Method::DELETE,
                "https://api.websim.dev/v1/users/user_2",
                RequestOptions::default().bearer(API_KEY),
            ))
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(response.text(), "");
        assert_eq!(router.store().lock().len(), 1);
    }

    #[test]
    fn create_returns_created_record() {
        let router = router();
        let response = router
            .dispatch(&request(
                Method::POST,
                "https://api.websim.dev/v1/users",
                RequestOptions::default().bearer(API_KEY).json_body(
                    json!({"username": "carol", "email": "carol@example.com", "password": "pw"})
                        .to_string(),
                ),
            ))
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let payload = body_json(&response);
        assert_eq!(payload["id"], "user_3");
        assert_eq!(payload["username"], "carol");
        assert!(payload.get("password").is_none());
    }
}
