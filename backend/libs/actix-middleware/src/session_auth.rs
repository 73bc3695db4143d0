use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use crypto_core::SessionKeys;
use futures::future::{ready, Ready};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;

/// Default name of the login cookie
pub const DEFAULT_SESSION_COOKIE: &str = "blog_session";

/// Identity resolved from a valid session token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub user_id: i64,
    pub username: String,
}

/// Session authentication middleware
///
/// Reads the session cookie (or an `Authorization: Bearer` header), validates
/// it and stores a [`SessionUser`] in the request extensions. Requests without
/// a valid token pass through anonymously; handlers decide whether that is
/// acceptable by extracting `SessionUser` or `Option<SessionUser>`.
#[derive(Clone)]
pub struct SessionAuth {
    keys: Arc<SessionKeys>,
    cookie_name: Rc<str>,
}

impl SessionAuth {
    pub fn new(keys: Arc<SessionKeys>, cookie_name: &str) -> Self {
        Self {
            keys,
            cookie_name: Rc::from(cookie_name),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SessionAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = SessionAuthService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionAuthService {
            service: Rc::new(service),
            keys: self.keys.clone(),
            cookie_name: self.cookie_name.clone(),
        }))
    }
}

pub struct SessionAuthService<S> {
    service: Rc<S>,
    keys: Arc<SessionKeys>,
    cookie_name: Rc<str>,
}

impl<S> SessionAuthService<S> {
    fn token_from_request(&self, req: &ServiceRequest) -> Option<String> {
        if let Some(cookie) = req.cookie(&self.cookie_name) {
            return Some(cookie.value().to_string());
        }

        req.headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::to_string)
    }
}

impl<S, B> Service<ServiceRequest> for SessionAuthService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if let Some(token) = self.token_from_request(&req) {
            let resolved = self.keys.validate(&token).and_then(|claims| {
                let user_id = claims.user_id()?;
                Ok(SessionUser {
                    user_id,
                    username: claims.username,
                })
            });

            match resolved {
                Ok(user) => {
                    req.extensions_mut().insert(user);
                }
                Err(e) => {
                    tracing::warn!(path = %req.path(), error = %e, "ignoring invalid session token");
                }
            }
        }

        let service = self.service.clone();
        Box::pin(async move { service.call(req).await })
    }
}

/// FromRequest implementation for SessionUser
///
/// Fails with 401 when the middleware did not resolve an identity. Use
/// `Option<SessionUser>` to branch on anonymous callers instead.
impl actix_web::FromRequest for SessionUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        _payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        match req.extensions().get::<SessionUser>() {
            Some(user) => ready(Ok(user.clone())),
            None => ready(Err(actix_web::error::ErrorUnauthorized(
                "User not authenticated",
            ))),
        }
    }
}
