use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use portalguard_core::CredentialSlot;

use crate::{Gateway, GatewayDecision, cookies};

/// Axum middleware running [`Gateway::evaluate`] in front of every request.
pub async fn gateway_middleware(
    State(gateway): State<Arc<Gateway>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let decision = match gateway.evaluate(req.uri(), req.headers()).await {
        Ok(decision) => decision,
        Err(err) => {
            tracing::warn!(error = %err, path = req.uri().path(), "gateway could not evaluate request");
            return err.into_response();
        }
    };

    let policy = &gateway.config().credentials;
    match decision {
        GatewayDecision::Pass(context) => {
            req.extensions_mut().insert(context);
            next.run(req).await
        }
        GatewayDecision::Login { location, rejection } => {
            let mut cookies_out = Vec::new();
            if rejection.purges_credentials() {
                cookies_out.extend(CredentialSlot::ALL.iter().map(|slot| cookies::clear_cookie(policy, *slot)));
            }
            redirect(location.as_str(), cookies_out)
        }
        GatewayDecision::Promote { credential, location } => {
            let cookie = cookies::set_cookie(
                policy,
                CredentialSlot::Primary,
                &credential,
                policy.promoted_lifetime(),
            );
            redirect(location.as_str(), vec![cookie])
        }
    }
}

/// 307 keeps the method of the original request.
fn redirect(location: &str, set_cookies: Vec<String>) -> Response {
    let mut response = StatusCode::TEMPORARY_REDIRECT.into_response();
    let headers = response.headers_mut();

    match HeaderValue::from_str(location) {
        Ok(value) => {
            headers.insert(header::LOCATION, value);
        }
        Err(err) => {
            tracing::warn!(error = %err, "redirect location is not a valid header value");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    }

    for cookie in set_cookies {
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                headers.append(header::SET_COOKIE, value);
            }
            Err(err) => tracing::warn!(error = %err, "skipping unencodable Set-Cookie header"),
        }
    }
    response
}
