//! HTTP client for the dashboard backend with consistent header injection and
//! error mapping. Protected calls read the token from the session store at the
//! moment the request is built, never from a value captured earlier. Nothing here
//! retries; callers decide.

use super::{errors::ApiError, Envelope};
use crate::{config::AppConfig, storage::SessionStore, APP_USER_AGENT};
use reqwest::{
    header::{ACCEPT, AUTHORIZATION},
    Client, RequestBuilder, Response,
};
use secrecy::ExposeSecret;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, instrument, warn};

/// Authorization policy of an endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Auth {
    /// No `authorization` header is sent.
    Anonymous,
    /// The current session token is sent; the call fails without a session.
    Session,
}

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    store: SessionStore,
}

impl ApiClient {
    /// # Errors
    /// Returns an error if the underlying HTTP client can not be built.
    pub fn new(config: &AppConfig, store: SessionStore) -> Result<Self, ApiError> {
        let mut builder = Client::builder().user_agent(APP_USER_AGENT);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|err| ApiError::Serialization(format!("Failed to build client: {err}")))?;

        Ok(Self {
            http,
            base_url: config.api_base_url.clone(),
            store,
        })
    }

    #[must_use]
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// GETs JSON and unwraps the `{data: ...}` envelope.
    ///
    /// # Errors
    /// Returns an error on network failure, non-2xx status or undecodable body.
    #[instrument(skip(self, query))]
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        auth: Auth,
    ) -> Result<T, ApiError> {
        let request = self.http.get(self.build_url(path)).query(query);
        let request = self.authorize(request, auth)?;
        let envelope: Envelope<T> = self.execute(request).await?;
        Ok(envelope.into_data())
    }

    /// POSTs a JSON body and unwraps the `{data: ...}` envelope.
    ///
    /// # Errors
    /// Returns an error on network failure, non-2xx status or undecodable body.
    #[instrument(skip(self, body))]
    pub async fn post_json<B, T>(&self, path: &str, body: &B, auth: Auth) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = serde_json::to_vec(body)
            .map_err(|err| ApiError::Serialization(format!("Failed to encode request: {err}")))?;
        let request = self
            .http
            .post(self.build_url(path))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(payload);
        let request = self.authorize(request, auth)?;
        let envelope: Envelope<T> = self.execute(request).await?;
        Ok(envelope.into_data())
    }

    fn build_url(&self, path: &str) -> String {
        build_url_with_base(&self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder, auth: Auth) -> Result<RequestBuilder, ApiError> {
        let request = request.header(ACCEPT, "application/json");
        match auth {
            Auth::Anonymous => Ok(request),
            Auth::Session => {
                let token = self.store.read_auth_token().ok_or(ApiError::MissingSession)?;
                Ok(request.header(AUTHORIZATION, token.expose_secret()))
            }
        }
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await.map_err(map_request_error)?;
        handle_json_response(response).await
    }
}

/// Joins the API base and an endpoint path with exactly one slash.
fn build_url_with_base(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();

    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

fn map_request_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout("Request timed out. Please try again.".to_string())
    } else if err.is_builder() {
        ApiError::Serialization(format!("Failed to build request: {err}"))
    } else {
        ApiError::Network(format!("Unable to reach the server: {err}"))
    }
}

async fn handle_json_response<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    let bytes = response.bytes().await.map_err(map_request_error)?;

    if status.is_success() {
        debug!(status = status.as_u16(), "request succeeded");
        // Empty success bodies decode as JSON null.
        let body: &[u8] = if bytes.is_empty() { b"null" } else { &bytes };
        let value: Value = serde_json::from_slice(body)
            .map_err(|err| ApiError::Parse(format!("Failed to decode response: {err}")))?;
        // A 2xx envelope can still report failure in its body.
        if value.get("success").and_then(Value::as_bool) == Some(false) {
            warn!(status = status.as_u16(), "request rejected in response body");
            return Err(ApiError::from_response(
                status.as_u16(),
                &String::from_utf8_lossy(&bytes),
            ));
        }
        serde_json::from_value(value)
            .map_err(|err| ApiError::Parse(format!("Failed to decode response: {err}")))
    } else {
        let body = String::from_utf8_lossy(&bytes);
        warn!(status = status.as_u16(), "request rejected by server");
        Err(ApiError::from_response(status.as_u16(), &body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStorage, Session};
    use serde::Deserialize;
    use serde_json::json;
    use std::{net::TcpListener, sync::Arc};
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn client(uri: &str) -> ApiClient {
        let config = AppConfig::new(uri, "/tmp/refdash-tests").unwrap();
        let store = SessionStore::new(Arc::new(MemoryStorage::new()));
        ApiClient::new(&config, store).unwrap()
    }

    fn session(token: &str) -> Session {
        Session {
            token: token.to_string(),
            manager_id: "m1".to_string(),
            manager_name: "A".to_string(),
            manager_email: "a@x.com".to_string(),
            ref_code: "R1".to_string(),
        }
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Echo {
        value: u32,
    }

    #[test]
    fn build_url_with_base_handles_slashes() {
        assert_eq!(
            build_url_with_base("https://api.example.com/api/", "/utm/manager/login"),
            "https://api.example.com/api/utm/manager/login"
        );
        assert_eq!(
            build_url_with_base("https://api.example.com/api", "utm/managers/m1"),
            "https://api.example.com/api/utm/managers/m1"
        );
        assert_eq!(build_url_with_base("  ", "/health"), "/health");
    }

    #[tokio::test]
    async fn anonymous_requests_send_no_authorization_header() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/utm/manager/login"))
            .and(body_json(json!({"email": "a@x.com"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"value": 1}})))
            .mount(&server)
            .await;

        let client = client(&server.uri());
        client.store().save_session(&session("tok1")).unwrap();
        let echo: Echo = client
            .post_json("/utm/manager/login", &json!({"email": "a@x.com"}), Auth::Anonymous)
            .await
            .unwrap();
        assert_eq!(echo, Echo { value: 1 });

        let requests: Vec<Request> = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(!requests[0].headers.contains_key("authorization"));
    }

    #[tokio::test]
    async fn session_requests_read_token_at_call_time() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/transactions/getAll"))
            .and(header("authorization", "tok2"))
            .and(query_param("pageNumber", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": 7})))
            .mount(&server)
            .await;

        // The client exists before any session; the token is created afterwards.
        let client = client(&server.uri());
        client.store().save_session(&session("tok1")).unwrap();
        client.store().save_session(&session("tok2")).unwrap();

        let echo: Echo = client
            .get_json(
                "/transactions/getAll",
                &[("pageNumber", "1".to_string())],
                Auth::Session,
            )
            .await
            .unwrap();
        assert_eq!(echo.value, 7);
    }

    #[tokio::test]
    async fn session_requests_without_session_never_hit_the_network() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        let client = client(&server.uri());

        let result: Result<Echo, _> = client
            .get_json("/transactions/getAll", &[], Auth::Session)
            .await;
        assert!(matches!(result, Err(ApiError::MissingSession)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn success_false_body_is_an_error_not_a_default_payload() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/utm/managers/m1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                json!({"success": false, "message": "Manager not found"}),
            ))
            .mount(&server)
            .await;

        let client = client(&server.uri());
        let result: Result<crate::features::dashboard::ManagerProfile, _> = client
            .get_json("/utm/managers/m1", &[], Auth::Anonymous)
            .await;
        let err = result.unwrap_err();
        assert_eq!(err.status(), Some(200));
        assert_eq!(err.user_message(), "Manager not found");
    }

    #[tokio::test]
    async fn non_success_status_surfaces_status_and_body() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/utm/manager/verify-otp"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"message": "OTP expired"})),
            )
            .mount(&server)
            .await;

        let client = client(&server.uri());
        let result: Result<Echo, _> = client
            .post_json("/utm/manager/verify-otp", &json!({}), Auth::Anonymous)
            .await;
        let err = result.unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.server_message(), Some("OTP expired"));
        assert!(err.body().unwrap().contains("OTP expired"));
    }

    #[tokio::test]
    async fn undecodable_success_body_is_a_parse_error() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/utm/managers/m1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let client = client(&server.uri());
        let result: Result<Echo, _> = client.get_json("/utm/managers/m1", &[], Auth::Anonymous).await;
        assert!(matches!(result, Err(ApiError::Parse(_))));
    }

    #[tokio::test]
    async fn unreachable_server_is_a_network_error() {
        let client = client("http://127.0.0.1:9");
        let result: Result<Echo, _> = client.get_json("/utm/managers/m1", &[], Auth::Anonymous).await;
        assert!(matches!(
            result,
            Err(ApiError::Network(_) | ApiError::Timeout(_))
        ));
    }
}
