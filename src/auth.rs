//! Caller identity as an explicit handler argument. Protected handlers take
//! an `AuthenticatedUser` parameter; nothing digs the current user out of
//! ambient request state.

use crate::config::Settings;
use crate::veil::{Cause, Describe, Error, ExternalError, Fallible};
use actix_web::http::header::Header;
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use actix_web_httpauth::headers::authorization::{Authorization, Bearer};
use jsonwebtoken::{
    decode, encode, Algorithm, DecodingKey, EncodingKey, Header as JwtHeader, Validation,
};
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};

/// The verified identity of the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: i32,
    pub username: String,
}

#[derive(Serialize, Deserialize)]
struct Claims {
    sub: i32,
    name: String,
    exp: usize,
}

const TOKEN_DAYS: i64 = 30;

const LOGIN_REQUIRED: ExternalError = ExternalError {
    cause: Cause::Unauthorized,
    text: "login required",
};

/// Sign a bearer token for the given user.
pub fn issue_token(user_id: i32, username: &str, secret: &str) -> Fallible<String> {
    let exp = (chrono::Utc::now() + chrono::Duration::days(TOKEN_DAYS)).timestamp() as usize;
    let claims = Claims {
        sub: user_id,
        name: username.to_owned(),
        exp,
    };
    Ok(encode(
        &JwtHeader::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?)
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Fallible<Self>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Fallible<AuthenticatedUser> {
    let settings = req
        .app_data::<web::Data<Settings>>()
        .ok_or_else(|| {
            anyhow::anyhow!("Settings not registered on the app").describe(ExternalError::default())
        })?;

    if settings.disable_auth {
        if let Some(user) = identity_from_headers(req) {
            return Ok(user);
        }
    }

    let header = Authorization::<Bearer>::parse(req).map_err(|e| e.describe(LOGIN_REQUIRED))?;
    let bearer = header.into_scheme();
    let data = decode::<Claims>(
        bearer.token(),
        &DecodingKey::from_secret(settings.auth_secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|e| e.describe(LOGIN_REQUIRED))?;
    Ok(AuthenticatedUser {
        id: data.claims.sub,
        username: data.claims.name,
    })
}

/// Identity from plain headers. Only consulted when `disable_auth` is set.
fn identity_from_headers(req: &HttpRequest) -> Option<AuthenticatedUser> {
    let id = req
        .headers()
        .get("x-user-id")?
        .to_str()
        .ok()?
        .parse()
        .ok()?;
    let username = req.headers().get("x-user-name")?.to_str().ok()?.to_owned();
    Some(AuthenticatedUser { id, username })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;
    use std::path::PathBuf;
    use std::time::Duration;

    fn settings(disable_auth: bool) -> Settings {
        Settings {
            auth_secret: "test-secret".to_owned(),
            disable_auth,
            media_root: PathBuf::from("media"),
            index_ttl: Duration::from_secs(20),
        }
    }

    #[actix_rt::test]
    async fn token_roundtrip() {
        let token = issue_token(3, "someuser", "test-secret").unwrap();
        let req = TestRequest::default()
            .app_data(web::Data::new(settings(false)))
            .insert_header(("authorization", format!("Bearer {token}")))
            .to_http_request();
        let user = authenticate(&req).unwrap();
        assert_eq!(
            user,
            AuthenticatedUser {
                id: 3,
                username: "someuser".to_owned()
            }
        );
    }

    #[actix_rt::test]
    async fn wrong_key_is_unauthorized() {
        let token = issue_token(3, "someuser", "other-secret").unwrap();
        let req = TestRequest::default()
            .app_data(web::Data::new(settings(false)))
            .insert_header(("authorization", format!("Bearer {token}")))
            .to_http_request();
        let err = authenticate(&req).unwrap_err();
        assert_eq!(err.external.cause, Cause::Unauthorized);
    }

    #[actix_rt::test]
    async fn header_identity_needs_disable_auth() {
        let build = |disable| {
            TestRequest::default()
                .app_data(web::Data::new(settings(disable)))
                .insert_header(("x-user-id", "5"))
                .insert_header(("x-user-name", "someuser"))
                .to_http_request()
        };
        let user = authenticate(&build(true)).unwrap();
        assert_eq!(user.id, 5);
        assert!(authenticate(&build(false)).is_err());
    }
}
