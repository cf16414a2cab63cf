use crate::models::{AccountInfo, PortalConfig, Tutorial};
use crate::normalize::normalize_tutorial;
use crate::storage::{TOKEN_KEY, USER_KEY};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ApiErrorKind {
    Unauthorized,
    Network,
    Http,
    Parse,
}

#[derive(Clone, Debug)]
pub(crate) struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ApiError {
    fn network(e: reqwest::Error) -> Self {
        Self {
            kind: ApiErrorKind::Network,
            message: e.to_string(),
        }
    }

    fn parse(e: impl std::fmt::Display) -> Self {
        Self {
            kind: ApiErrorKind::Parse,
            message: e.to_string(),
        }
    }

    fn unauthorized() -> Self {
        Self {
            kind: ApiErrorKind::Unauthorized,
            message: "Unauthorized".to_string(),
        }
    }

    fn http(status: reqwest::StatusCode, body: String, ctx: &str) -> Self {
        Self {
            kind: ApiErrorKind::Http,
            message: format!("{ctx} ({status}): {body}"),
        }
    }
}

pub(crate) type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct EnvConfig {
    pub api_url: String,
}

impl EnvConfig {
    pub fn new() -> Self {
        let default_api_url = "http://localhost:5089".to_string();

        // We support BOTH `window.ENV.API_URL` (documented in README) and
        // `window.ENV.api_url` (legacy/implementation detail) for compatibility.
        if let Some(window) = web_sys::window() {
            if let Some(env) = window.get("ENV") {
                if !env.is_undefined() && env.is_object() {
                    if let Ok(api_url) = js_sys::Reflect::get(&env, &"API_URL".into()) {
                        if let Some(url_str) = api_url.as_string() {
                            return Self { api_url: url_str };
                        }
                    }

                    if let Ok(api_url) = js_sys::Reflect::get(&env, &"api_url".into()) {
                        if let Some(url_str) = api_url.as_string() {
                            return Self { api_url: url_str };
                        }
                    }
                }
            }
        }

        Self {
            api_url: default_api_url,
        }
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn get_api_url() -> String {
    EnvConfig::new().api_url
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct LoginResponse {
    pub token: String,
    pub user: AccountInfo,
}

#[derive(Clone)]
pub(crate) struct ApiClient {
    pub(crate) base_url: String,
    pub(crate) token: Option<String>,
}

impl ApiClient {
    #[allow(dead_code)]
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            token: None,
        }
    }

    pub fn load_from_storage() -> Self {
        let base_url = get_api_url();
        let token = leptos::web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .and_then(|s| s.get_item(TOKEN_KEY).ok().flatten());

        Self { base_url, token }
    }

    pub fn save_to_storage(&self) {
        if let Some(storage) =
            leptos::web_sys::window().and_then(|w| w.local_storage().ok().flatten())
        {
            if let Some(token) = &self.token {
                let _ = storage.set_item(TOKEN_KEY, token);
            }
        }
    }

    pub fn clear_storage() {
        if let Some(storage) =
            leptos::web_sys::window().and_then(|w| w.local_storage().ok().flatten())
        {
            let _ = storage.remove_item(TOKEN_KEY);
            let _ = storage.remove_item(USER_KEY);
        }
    }

    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    pub(crate) fn get_auth_token(&self) -> Option<String> {
        self.token.clone()
    }

    fn with_auth_headers(
        mut req: reqwest::RequestBuilder,
        token: Option<String>,
    ) -> reqwest::RequestBuilder {
        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }
        req
    }

    async fn request_api<T: serde::de::DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&impl serde::Serialize>,
    ) -> ApiResult<T> {
        let client = reqwest::Client::new();
        let url = format!("{}{}", self.base_url, path);
        let mut req = client.request(method, url);
        req = Self::with_auth_headers(req, self.get_auth_token());

        if let Some(b) = body {
            req = req.json(b);
        }

        let res = req.send().await.map_err(ApiError::network)?;

        if res.status().is_success() {
            res.json().await.map_err(ApiError::parse)
        } else if res.status().as_u16() == 401 {
            Err(ApiError::unauthorized())
        } else {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            Err(ApiError::http(status, body, "Request failed"))
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> ApiResult<LoginResponse> {
        self.request_api(
            reqwest::Method::POST,
            "/api/auth/login",
            Some(&LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            }),
        )
        .await
    }

    /// Validate the stored token at boot. Any failure means "not logged in";
    /// only 401 is authoritative, but the caller treats all failures the
    /// same and falls back to the login screen.
    pub async fn verify_token(&self) -> ApiResult<AccountInfo> {
        self.request_api(
            reqwest::Method::GET,
            "/api/auth/verify",
            None::<&serde_json::Value>,
        )
        .await
    }

    /// Raw page records; key casing is reconciled by the Normalizer.
    pub async fn get_pages(&self) -> ApiResult<Vec<serde_json::Value>> {
        self.request_api(reqwest::Method::GET, "/api/pages", None::<&serde_json::Value>)
            .await
    }

    /// Raw menu records (nested tree shape).
    pub async fn get_menu(&self) -> ApiResult<Vec<serde_json::Value>> {
        self.request_api(reqwest::Method::GET, "/api/menu", None::<&serde_json::Value>)
            .await
    }

    /// Tutorial lookup for one page. A missing tutorial is not an error:
    /// 404 and empty bodies both map to `None`.
    pub async fn get_tutorial(&self, page_id: i64) -> ApiResult<Option<Tutorial>> {
        let res: ApiResult<serde_json::Value> = self
            .request_api(
                reqwest::Method::GET,
                &format!("/api/pages/{page_id}/tutorial"),
                None::<&serde_json::Value>,
            )
            .await;

        match res {
            Ok(data) if data.is_null() => Ok(None),
            Ok(data) => Ok(Some(normalize_tutorial(&data))),
            Err(e) if e.kind == ApiErrorKind::Http && e.message.contains("404") => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn get_config(&self) -> ApiResult<PortalConfig> {
        let data: serde_json::Value = self
            .request_api(
                reqwest::Method::GET,
                "/api/config",
                None::<&serde_json::Value>,
            )
            .await?;
        // Config records come back in the same mixed casing as everything
        // else; accept canonical camelCase directly, else defaults.
        Ok(serde_json::from_value(data).unwrap_or_default())
    }

    pub async fn save_config(&self, config: &PortalConfig) -> ApiResult<serde_json::Value> {
        self.request_api(reqwest::Method::PUT, "/api/config", Some(config))
            .await
    }

    pub fn logout(&mut self) {
        self.token = None;
        Self::clear_storage();
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_client_new() {
        let client = ApiClient::new("http://localhost:5089".to_string());
        assert_eq!(client.base_url, "http://localhost:5089");
        assert!(client.token.is_none());
    }

    #[test]
    fn test_api_client_set_token() {
        let mut client = ApiClient::new("http://localhost:5089".to_string());
        client.set_token("test-token".to_string());
        assert_eq!(client.token, Some("test-token".to_string()));
    }

    #[test]
    fn test_api_client_is_authenticated() {
        let mut client = ApiClient::new("http://localhost:5089".to_string());
        assert!(!client.is_authenticated());
        client.set_token("jwt".to_string());
        assert!(client.is_authenticated());
    }

    #[test]
    fn test_login_response_contract_deserialize() {
        let json = r#"{
            "token": "jwt-token",
            "user": {"Id": 1, "Username": "admin", "Role": "admin"}
        }"#;
        let parsed: LoginResponse =
            serde_json::from_str(json).expect("login response should parse");
        assert_eq!(parsed.token, "jwt-token");
        // user is opaque; just ensure it's an object
        assert!(parsed.user.extra.is_object());
    }
}
