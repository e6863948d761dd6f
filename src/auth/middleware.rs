use std::future::{Ready, ready};

use actix_session::SessionExt;
use actix_web::{
    Error, FromRequest, HttpMessage, HttpRequest, HttpResponse,
    body::MessageBody,
    dev::{Payload, ServiceRequest, ServiceResponse},
    http::header,
    middleware::Next,
    web,
};

use crate::auth::token::{TokenClaims, TokenSigner};
use crate::errors::{AppError, message};

/// Middleware function that checks for an authenticated session.
/// Redirects to /login if no session found.
pub async fn require_auth(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let session = req.get_session();
    let has_user = session.get::<i64>("user_id").unwrap_or(None).is_some();

    if !has_user {
        let response = HttpResponse::SeeOther()
            .insert_header((header::LOCATION, "/login"))
            .finish();
        return Ok(req.into_response(response).map_into_right_body());
    }

    next.call(req).await.map(|res| res.map_into_left_body())
}

/// Extract `<token>` from `Authorization: Bearer <token>`.
pub fn bearer_token(req: &ServiceRequest) -> Option<String> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Bearer-token guard for the JSON API. Short-circuits with 401 when the token
/// is missing, invalid or expired; otherwise stores the claims in request
/// extensions for the [`ApiUser`] extractor.
pub async fn require_token(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let Some(token) = bearer_token(&req) else {
        let response = HttpResponse::Unauthorized().json(message("Token is missing"));
        return Ok(req.into_response(response).map_into_right_body());
    };

    let claims = req
        .app_data::<web::Data<TokenSigner>>()
        .and_then(|signer| signer.verify_token(&token));

    match claims {
        Some(claims) => {
            req.extensions_mut().insert(claims);
            next.call(req).await.map(|res| res.map_into_left_body())
        }
        None => {
            let response =
                HttpResponse::Unauthorized().json(message("Invalid or expired token"));
            Ok(req.into_response(response).map_into_right_body())
        }
    }
}

/// Claims of the caller, available behind [`require_token`].
#[derive(Debug, Clone)]
pub struct ApiUser(pub TokenClaims);

impl FromRequest for ApiUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<TokenClaims>()
                .cloned()
                .map(ApiUser)
                .ok_or(AppError::Unauthorized),
        )
    }
}
