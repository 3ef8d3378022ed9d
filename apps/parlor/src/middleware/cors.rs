use std::env;

use actix_cors::Cors;
use actix_web::http::header;

/// CORS for the browser client. Origins come from
/// `PARLOR_CORS_ALLOWED_ORIGINS` (comma-separated); entries that are empty,
/// `null` or not http(s) are ignored.
pub fn cors_middleware() -> Cors {
    let allowed_raw = env::var("PARLOR_CORS_ALLOWED_ORIGINS").unwrap_or_default();
    let mut origins = parse_origins(&allowed_raw);
    if origins.is_empty() {
        origins = vec![
            "http://localhost:3000".to_string(),
            "http://127.0.0.1:3000".to_string(),
        ];
    }

    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
        ])
        .expose_headers(vec![header::HeaderName::from_static("x-request-id")])
        .max_age(3600);

    for origin in origins {
        cors = cors.allowed_origin(&origin);
    }
    cors
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != "null")
        .filter(|s| s.starts_with("http://") || s.starts_with("https://"))
        .map(str::to_string)
        .collect()
}
