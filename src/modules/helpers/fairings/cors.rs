use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::Header;
use rocket::{Request, Response};

pub const ALLOWED_HEADERS: &str = "Content-Type, X-Runner-Pin, X-Role, X-Admin-Key";

/// # CORS
/// allows the dashboard frontend to call the api and to open the event
/// stream. requests from other origins get no cors headers.
pub struct CORS {
    allowed_origins: Vec<String>,
}

impl CORS {
    pub fn new(allowed_origins: Vec<String>) -> CORS {
        CORS { allowed_origins }
    }

    pub fn is_allowed(&self, origin: &str) -> bool {
        self.allowed_origins.iter().any(|allowed| allowed == origin)
    }
}

#[rocket::async_trait]
impl Fairing for CORS {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, request: &'r Request<'_>, response: &mut Response<'r>) {
        let origin = match request.headers().get_one("Origin") {
            Some(origin) if self.is_allowed(origin) => origin.to_string(),
            _ => return,
        };

        response.set_header(Header::new("Access-Control-Allow-Origin", origin));
        response.set_header(Header::new("Vary", "Origin"));
        response.set_header(Header::new("Access-Control-Allow-Methods", "GET, POST, OPTIONS"));
        response.set_header(Header::new("Access-Control-Allow-Headers", ALLOWED_HEADERS));
        response.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_listed_origins_are_allowed() {
        let cors = CORS::new(vec!["https://relay.example.org".to_string()]);
        assert!(cors.is_allowed("https://relay.example.org"));
        assert!(!cors.is_allowed("https://evil.example.org"));
    }
}
