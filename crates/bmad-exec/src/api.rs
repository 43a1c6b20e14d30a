use std::fmt;

use chrono::DateTime;
use chrono::SecondsFormat;
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use serde_json::Value;

pub const API_PREFIX: &str = "/api";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Options,
    Other(String),
}

impl Method {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "GET" => Self::Get,
            "POST" => Self::Post,
            "OPTIONS" => Self::Options,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Options => "OPTIONS",
            Self::Other(raw) => raw,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Path segments below the optional `/api` prefix, query string removed.
    pub fn segments(&self) -> Vec<&str> {
        let path = self.path.split(['?', '#']).next().unwrap_or_default();
        let path = match path.strip_prefix(API_PREFIX) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
            _ => path,
        };
        path.split('/').filter(|segment| !segment.is_empty()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiResponse {
    fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: Some(body),
        }
    }

    fn empty(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: None,
        }
    }

    fn with_cors(mut self, origin: &str) -> Self {
        for (name, value) in [
            ("Access-Control-Allow-Origin", origin),
            ("Access-Control-Allow-Methods", "GET, POST, OPTIONS"),
            ("Access-Control-Allow-Headers", "Content-Type, Authorization"),
            ("Access-Control-Allow-Credentials", "true"),
        ] {
            self.headers.push((name.to_string(), value.to_string()));
        }
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
}

pub const TOOLS: [ToolDescriptor; 2] = [
    ToolDescriptor {
        name: "get_weather",
        description: "Get current weather for a city",
    },
    ToolDescriptor {
        name: "search_knowledge",
        description: "Search internal knowledge base",
    },
];

/// Routes one request. Every response, errors included, carries the CORS
/// headers for `cors_origin`.
pub fn route(request: &ApiRequest, now: DateTime<Utc>, cors_origin: &str) -> ApiResponse {
    let response = match request.method {
        Method::Options => ApiResponse::empty(200),
        Method::Get | Method::Post => route_json(request, now),
        Method::Other(_) => not_found(&request.segments()),
    };
    tracing::debug!(
        method = %request.method,
        path = %request.path,
        status = response.status,
        "api request"
    );
    response.with_cors(cors_origin)
}

fn route_json(request: &ApiRequest, now: DateTime<Utc>) -> ApiResponse {
    let segments = request.segments();
    match (segments.first().copied(), &request.method) {
        (None, _) | (Some("health"), _) => ApiResponse::json(
            200,
            json!({
                "status": "operational",
                "timestamp": now.to_rfc3339_opts(SecondsFormat::Millis, true),
            }),
        ),
        (Some("chat"), Method::Post) => chat(request.body.as_deref()),
        (Some("tools"), Method::Get) => ApiResponse::json(200, json!({ "tools": TOOLS })),
        _ => not_found(&segments),
    }
}

fn chat(body: Option<&str>) -> ApiResponse {
    let parsed = match body.map(serde_json::from_str::<Value>) {
        Some(Ok(value)) if !value.is_null() => value,
        Some(Err(err)) => {
            tracing::warn!(error = %err, "rejecting undecodable chat body");
            return internal_error();
        }
        _ => return internal_error(),
    };
    let Some(messages) = parsed.get("messages").and_then(Value::as_array) else {
        return ApiResponse::json(400, json!({ "error": "messages array required" }));
    };
    ApiResponse::json(
        200,
        json!({
            "response": format!(
                "Agent received {} messages. Mastermind orchestration incoming.",
                messages.len()
            ),
        }),
    )
}

fn internal_error() -> ApiResponse {
    ApiResponse::json(500, json!({ "error": "Internal server error" }))
}

fn not_found(segments: &[&str]) -> ApiResponse {
    ApiResponse::json(
        404,
        json!({ "error": format!("Route /{} not implemented yet.", segments.join("/")) }),
    )
}
