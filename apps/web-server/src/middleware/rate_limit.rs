//! Rate limiting middleware for form submissions.

use actix_web::{
    Error,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::Method,
};
use std::future::{Future, Ready, ready};
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;

use yatube_core::ports::RateLimiter;

use crate::middleware::error::AppError;
use crate::observability::RequestId;

/// Rate limiting middleware factory. Only `POST` requests are counted.
pub struct RateLimitMiddleware {
    limiter: Arc<dyn RateLimiter>,
}

impl RateLimitMiddleware {
    pub fn new(limiter: Arc<dyn RateLimiter>) -> Self {
        Self { limiter }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimitMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RateLimitMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddlewareService {
            service: Rc::new(service),
            limiter: self.limiter.clone(),
        }))
    }
}

pub struct RateLimitMiddlewareService<S> {
    service: Rc<S>,
    limiter: Arc<dyn RateLimiter>,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();

        if req.method() != Method::POST {
            return Box::pin(async move { Ok(service.call(req).await?.map_into_left_body()) });
        }

        let limiter = self.limiter.clone();
        // Client address + path: login and signup get separate budgets.
        let key = format!(
            "{}:{}",
            req.connection_info()
                .realip_remote_addr()
                .unwrap_or("unknown"),
            req.path()
        );

        Box::pin(async move {
            match limiter.check(&key).await {
                Ok(result) if !result.allowed => {
                    tracing::warn!("Rate limit exceeded for key: {}", key);
                    let request_id = RequestId::of(&req);
                    let response = AppError::TooManyRequests(result.reset_after.as_secs().max(1))
                        .page(request_id.as_deref());
                    return Ok(req.into_response(response).map_into_right_body());
                }
                Ok(_) => {}
                Err(e) => tracing::error!("Rate limiter error, failing open: {}", e),
            }

            Ok(service.call(req).await?.map_into_left_body())
        })
    }
}
