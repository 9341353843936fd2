use std::convert::Infallible;

use rocket::request::{FromRequest, Outcome, Request};

use crate::modules::ingestion::Credentials;

pub const PIN_HEADER: &str = "X-Runner-Pin";
pub const ROLE_HEADER: &str = "X-Role";
pub const ADMIN_KEY_HEADER: &str = "X-Admin-Key";

/// collects the credential headers. checking them is up to the ingestion
/// gateway, so this guard never fails.
#[rocket::async_trait]
impl<'r> FromRequest<'r> for Credentials {
    type Error = Infallible;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let header = |name: &str| {
            request
                .headers()
                .get_one(name)
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        Outcome::Success(Credentials {
            pin: header(PIN_HEADER),
            role: header(ROLE_HEADER),
            admin_key: header(ADMIN_KEY_HEADER),
        })
    }
}
