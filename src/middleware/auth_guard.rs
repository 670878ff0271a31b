/// Caller-identity guard
///
/// Protects a route scope by resolving the bearer access token to a full
/// `User` (via `AuthService::identify`) and injecting it into request
/// extensions, where handlers pick it up with `web::ReqData<User>`.
/// Any failure answers 401 with a fixed, non-leaking body.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage, HttpResponse,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;

use crate::auth::AuthService;

pub struct AuthGuard {
    auth: AuthService,
}

impl AuthGuard {
    pub fn new(auth: AuthService) -> Self {
        Self { auth }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthGuardService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(AuthGuardService {
            service: Rc::new(service),
            auth: self.auth.clone(),
        }))
    }
}

pub struct AuthGuardService<S> {
    service: Rc<S>,
    auth: AuthService,
}

fn unauthorized(message: &str) -> Error {
    let response = HttpResponse::Unauthorized().json(serde_json::json!({
        "message": message,
        "code": "UNAUTHORIZED"
    }));
    actix_web::error::InternalError::from_response("Unauthorized", response).into()
}

impl<S, B> Service<ServiceRequest> for AuthGuardService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let bearer = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::to_owned);

        let auth = self.auth.clone();
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let token = match bearer {
                Some(token) => token,
                None => {
                    tracing::warn!("Missing or malformed Authorization header");
                    return Err(unauthorized("Could not validate credentials"));
                }
            };

            match auth.identify(&token).await {
                Ok(user) => {
                    tracing::debug!(user_id = %user.id, "Caller identified");
                    req.extensions_mut().insert(user);
                    service.call(req).await
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Caller identification failed");
                    Err(unauthorized("Could not validate credentials"))
                }
            }
        })
    }
}
