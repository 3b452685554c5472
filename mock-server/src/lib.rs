use std::time::Duration;

use axum::{
    body::Bytes,
    extract::Path,
    http::{HeaderMap, Method, StatusCode},
    response::Redirect,
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// What `/anything` saw of the incoming request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
    pub body_len: usize,
}

impl Echo {
    /// All values sent under `name`, in the order they arrived.
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }
}

pub fn app() -> Router {
    Router::new()
        .route("/anything", any(echo))
        .route("/status/{code}", get(status))
        .route("/redirect", get(redirect))
        .route("/delay/{ms}", get(delay))
        .route("/bytes/{n}", get(bytes))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn echo(method: Method, headers: HeaderMap, body: Bytes) -> Json<Echo> {
    let headers = headers
        .iter()
        .map(|(k, v)| {
            (
                k.as_str().to_string(),
                String::from_utf8_lossy(v.as_bytes()).into_owned(),
            )
        })
        .collect();
    Json(Echo {
        method: method.to_string(),
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
        body_len: body.len(),
    })
}

async fn status(Path(code): Path<u16>) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST)
}

async fn redirect() -> Redirect {
    Redirect::to("/anything")
}

async fn delay(Path(ms): Path<u64>) -> &'static str {
    tokio::time::sleep(Duration::from_millis(ms)).await;
    "done"
}

async fn bytes(Path(n): Path<usize>) -> Vec<u8> {
    vec![b'x'; n]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn echo_with(headers: &[(&str, &str)]) -> Echo {
        Echo {
            method: "GET".to_string(),
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body: String::new(),
            body_len: 0,
        }
    }

    #[test]
    fn echo_serializes_headers_as_pairs() {
        let echo = echo_with(&[("x-seq", "1")]);
        let json = serde_json::to_value(&echo).unwrap();
        assert_eq!(json["method"], "GET");
        assert_eq!(json["headers"][0][0], "x-seq");
        assert_eq!(json["headers"][0][1], "1");
        assert_eq!(json["body_len"], 0);
    }

    #[test]
    fn header_values_are_case_insensitive_and_ordered() {
        let echo = echo_with(&[("x-seq", "1"), ("accept", "*/*"), ("X-Seq", "2")]);
        assert_eq!(echo.header_values("X-SEQ"), vec!["1", "2"]);
        assert!(echo.header_values("content-type").is_empty());
    }
}
