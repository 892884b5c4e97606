use std::future::{ready, Ready};

use actix_http::Payload;
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest};

use crate::middleware::auth::{decode_token, Claims};
use crate::services::circuit_booking_service::Actor;

/// Best-effort identity for routes that serve both guests and signed-in
/// customers: yields `Some(Actor)` when a valid bearer token is present,
/// `None` otherwise, and never rejects the request.
pub struct MaybeActor(pub Option<Actor>);

impl FromRequest for MaybeActor {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        // Inside an authenticated scope the middleware already stashed the
        // claims; outside it, fall back to decoding the header ourselves.
        if let Some(claims) = req.extensions().get::<Claims>() {
            return ready(Ok(MaybeActor(Some(actor_from(claims)))));
        }

        let actor = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .and_then(|token| decode_token(token).ok())
            .map(|claims| actor_from(&claims));

        ready(Ok(MaybeActor(actor)))
    }
}

fn actor_from(claims: &Claims) -> Actor {
    Actor {
        user_id: claims.user_id.clone(),
        email: claims.sub.clone(),
    }
}
