//! Request ids: one per request, echoed in `X-Request-ID` and quoted on error pages.

use actix_web::{
    Error, HttpMessage,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::header::{HeaderName, HeaderValue},
};
use std::future::{Future, Ready, ready};
use std::pin::Pin;
use uuid::Uuid;

use crate::middleware::error::AppError;

/// Header name for request ID.
pub static REQUEST_ID_HEADER: &str = "X-Request-ID";

/// Id of the request being served, stored in the request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

impl RequestId {
    /// The id assigned by [`RequestIdMiddleware`], if it ran for this request.
    pub fn of(req: &impl HttpMessage) -> Option<String> {
        req.extensions().get::<RequestId>().map(|id| id.0.clone())
    }

    /// A proxy-supplied id, or a fresh one.
    fn resolve(incoming: Option<&HeaderValue>) -> Self {
        let id = incoming
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty() && v.len() <= 128)
            .map(String::from)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        Self(id)
    }
}

/// Tags every response with an `X-Request-ID` and re-renders application
/// error pages so they quote it.
pub struct RequestIdMiddleware;

impl<S, B> Transform<S, ServiceRequest> for RequestIdMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RequestIdService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestIdService { service }))
    }
}

pub struct RequestIdService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequestIdService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let request_id = RequestId::resolve(req.headers().get(REQUEST_ID_HEADER));

        tracing::debug!(request_id = %request_id.0, path = %req.path(), "Processing request");
        req.extensions_mut().insert(request_id.clone());

        let fut = self.service.call(req);

        Box::pin(async move {
            let res = fut.await?;

            let page = res
                .response()
                .error()
                .and_then(|err| err.as_error::<AppError>())
                .map(|err| {
                    tracing::debug!(request_id = %request_id.0, error = %err, "Request failed");
                    err.page(Some(&request_id.0))
                });
            let mut res = match page {
                Some(page) => res.into_response(page).map_into_right_body(),
                None => res.map_into_left_body(),
            };

            res.headers_mut().insert(
                HeaderName::from_static("x-request-id"),
                HeaderValue::from_str(&request_id.0)
                    .unwrap_or_else(|_| HeaderValue::from_static("unknown")),
            );
            Ok(res)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, HttpRequest, HttpResponse, http::StatusCode, test, web};

    async fn echo(req: HttpRequest) -> HttpResponse {
        HttpResponse::Ok().body(RequestId::of(&req).unwrap_or_default())
    }

    async fn broken() -> Result<HttpResponse, AppError> {
        Err(AppError::Internal("connection refused".to_string()))
    }

    #[actix_rt::test]
    async fn test_generated_id_is_visible_to_handlers() {
        let app = test::init_service(
            App::new()
                .wrap(RequestIdMiddleware)
                .route("/", web::get().to(echo)),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        let header = resp.headers().get("x-request-id").unwrap().to_str().unwrap().to_string();
        assert!(Uuid::parse_str(&header).is_ok());

        let body = test::read_body(resp).await;
        assert_eq!(body, header.as_bytes());
    }

    #[actix_rt::test]
    async fn test_error_page_quotes_incoming_id() {
        let app = test::init_service(
            App::new()
                .wrap(RequestIdMiddleware)
                .route("/broken", web::get().to(broken)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/broken")
            .insert_header((REQUEST_ID_HEADER, "edge-1234"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(resp.headers().get("x-request-id").unwrap(), "edge-1234");

        let html = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
        assert!(html.contains("Код запроса: edge-1234"));
        assert!(!html.contains("connection refused"));
    }

    #[::core::prelude::v1::test]
    fn test_oversized_incoming_id_is_replaced() {
        let long = HeaderValue::from_str(&"x".repeat(200)).unwrap();
        let id = RequestId::resolve(Some(&long));
        assert!(Uuid::parse_str(&id.0).is_ok());

        let empty = HeaderValue::from_static("");
        assert!(Uuid::parse_str(&RequestId::resolve(Some(&empty)).0).is_ok());
    }
}
