use async_trait::async_trait;
use log::{debug, error};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;

use crate::{
    Res,
    errors::Error,
    http::{Body, Method, Params, Transport},
    logging::Logger,
};

/// Form fields whose values never end up in the log.
const REDACTED_FIELDS: [&str; 3] = ["client_secret", "code", "refresh_token"];

/// [`Transport`] over `reqwest` with a fixed base URL and an optional bearer token.
///
/// Every request is logged before it is sent and every response (or
/// failure) after it arrives. Non-2xx responses become [`Error::Status`]
/// carrying the response body. Nothing is retried.
pub struct RestClient {
    http: Client,
    base_url: String,
    bearer: Option<String>,
    log: Logger,
}

impl RestClient {
    pub fn new(base_url: impl Into<String>, log: Logger) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bearer: None,
            log,
        }
    }

    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.bearer {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn dispatch(&self, method: Method, path: &str, request: RequestBuilder) -> Res<Value> {
        let target = self.log.target();

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                error!(target: target, "{} {} failed: {}", method, path, e);
                return Err(Error::Transport(e));
            }
        };

        let status = response.status();
        debug!(
            target: target,
            "{} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or_default()
        );

        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                error!(target: target, "{} {} failed reading body: {}", method, path, e);
                return Err(Error::Transport(e));
            }
        };

        if !status.is_success() {
            error!(
                target: target,
                "{} {} returned {}: {}",
                method,
                path,
                status.as_u16(),
                text
            );
            return Err(Error::Status {
                method: method.to_string(),
                path: path.to_string(),
                status: status.as_u16(),
                body: text,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl Transport for RestClient {
    async fn get(&self, path: &str, params: Option<&Params>) -> Res<Value> {
        match params.filter(|p| !p.is_empty()) {
            Some(p) => debug!(target: self.log.target(), "GET {}?{}", path, query_string(p)),
            None => debug!(target: self.log.target(), "GET {}", path),
        }

        let mut request = self.authorized(self.http.get(self.url(path)));
        if let Some(p) = params {
            request = request.query(p);
        }

        self.dispatch(Method::Get, path, request).await
    }

    async fn post(&self, path: &str, body: Body) -> Res<Value> {
        debug!(target: self.log.target(), "POST {} {}", path, describe_body(&body));

        let request = self.authorized(self.http.post(self.url(path)));
        let request = match &body {
            Body::Json(value) => request.json(value),
            Body::Form(fields) => request.form(fields),
        };

        self.dispatch(Method::Post, path, request).await
    }

    async fn delete(&self, path: &str) -> Res<Value> {
        debug!(target: self.log.target(), "DELETE {}", path);

        let request = self.authorized(self.http.delete(self.url(path)));
        self.dispatch(Method::Delete, path, request).await
    }
}

fn query_string(params: &Params) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

/// Body as it appears in the debug log, with secrets masked.
pub fn describe_body(body: &Body) -> String {
    match body {
        Body::Json(value) => value.to_string(),
        Body::Form(fields) => fields
            .iter()
            .map(|(k, v)| {
                if REDACTED_FIELDS.contains(&k.as_str()) {
                    format!("{}=***", k)
                } else {
                    format!("{}={}", k, v)
                }
            })
            .collect::<Vec<_>>()
            .join("&"),
    }
}
