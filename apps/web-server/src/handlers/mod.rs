//! HTTP handlers and route configuration.

mod admin;
mod auth;
mod health;
mod posts;

#[cfg(test)]
mod tests;

use actix_web::web;
use std::sync::Arc;

use yatube_core::ports::RateLimiter;

use crate::middleware::error::AppError;
use crate::middleware::rate_limit::RateLimitMiddleware;

/// Configure all application routes.
///
/// Form submissions under `/auth` go through `login_limiter`.
pub fn configure_routes(cfg: &mut web::ServiceConfig, login_limiter: Arc<dyn RateLimiter>) {
    cfg.route("/health", web::get().to(health::health_check))
        // Public pages
        .route("/", web::get().to(posts::index))
        .route("/group/{slug}/", web::get().to(posts::group_posts))
        .route("/profile/{username}/", web::get().to(posts::profile))
        .route("/posts/{post_id}/", web::get().to(posts::post_detail))
        // Session required
        .service(
            web::resource("/posts/{post_id}/edit/")
                .route(web::get().to(posts::post_edit_form))
                .route(web::post().to(posts::post_edit)),
        )
        .service(
            web::resource("/create/")
                .route(web::get().to(posts::post_create_form))
                .route(web::post().to(posts::post_create)),
        )
        // Auth
        .route("/auth/logout/", web::post().to(auth::logout))
        .service(
            web::scope("/auth")
                .wrap(RateLimitMiddleware::new(login_limiter))
                .service(
                    web::resource("/signup/")
                        .route(web::get().to(auth::signup_form))
                        .route(web::post().to(auth::signup)),
                )
                .service(
                    web::resource("/login/")
                        .route(web::get().to(auth::login_form))
                        .route(web::post().to(auth::login)),
                ),
        )
        // Staff
        .service(
            web::scope("/admin")
                .route("/posts/", web::get().to(admin::posts))
                .route(
                    "/posts/{post_id}/group/",
                    web::post().to(admin::change_post_group),
                )
                .service(
                    web::resource("/groups/")
                        .route(web::get().to(admin::groups))
                        .route(web::post().to(admin::create_group)),
                ),
        )
        .default_service(web::to(not_found));
}

async fn not_found() -> Result<actix_web::HttpResponse, AppError> {
    Err(AppError::NotFound("No page at this address".to_string()))
}
