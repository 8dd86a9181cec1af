use actix_web::cookie::Cookie;
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};

use yatube_core::admin::EMPTY_VALUE_DISPLAY;
use yatube_core::domain::{Group, NewGroup, NewPost, User};
use yatube_core::forms::REQUIRED;
use yatube_core::ports::PostQuery;
use yatube_shared::dto::{AdminGroupChange, GroupFormData, LoginRequest, PostFormData, SignupRequest};

use super::configure_routes;
use crate::config::AppConfig;
use crate::middleware::auth::SESSION_COOKIE;
use crate::state::AppState;

const PASSWORD: &str = "correct-horse-battery";

fn state_with(vars: &[(&str, &str)]) -> AppState {
    let config = AppConfig::from_lookup(|key| {
        vars.iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.to_string())
    });
    AppState::in_memory(&config)
}

fn state() -> AppState {
    state_with(&[])
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state.clone()))
                .configure(|cfg| configure_routes(cfg, $state.login_limiter.clone())),
        )
        .await
    };
}

async fn user(state: &AppState, username: &str) -> User {
    let hash = state.passwords.hash(PASSWORD).unwrap();
    state
        .users
        .create(User::new(username.to_string(), hash))
        .await
        .unwrap()
}

async fn staff(state: &AppState, username: &str) -> User {
    let hash = state.passwords.hash(PASSWORD).unwrap();
    state
        .users
        .create(User::new(username.to_string(), hash).staff())
        .await
        .unwrap()
}

async fn group(state: &AppState, slug: &str) -> Group {
    state
        .groups
        .create(NewGroup {
            title: format!("Группа {slug}"),
            slug: slug.to_string(),
            description: "Тестовое описание".to_string(),
        })
        .await
        .unwrap()
}

fn session(state: &AppState, user: &User) -> Cookie<'static> {
    let token = state
        .tokens
        .generate_token(user.id, &user.username, user.roles())
        .unwrap();
    Cookie::new(SESSION_COOKIE, token)
}

fn location(resp: &actix_web::dev::ServiceResponse) -> String {
    resp.headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string()
}

async fn body_of(resp: actix_web::dev::ServiceResponse) -> String {
    String::from_utf8(test::read_body(resp).await.to_vec()).unwrap()
}

fn cards(html: &str) -> usize {
    html.matches("подробная информация").count()
}

#[actix_rt::test]
async fn test_listings_paginate_ten_per_page() {
    let state = state();
    let author = user(&state, "Test_User").await;
    let g = group(&state, "test_group").await;
    for i in 0..13 {
        state
            .posts
            .create(NewPost::new(author.id, format!("Пост {i}"), Some(g.id)))
            .await
            .unwrap();
    }
    let app = app!(state);

    for uri in ["/", "/group/test_group/", "/profile/Test_User/"] {
        let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK, "{uri}");
        assert_eq!(cards(&body_of(resp).await), 10, "{uri}");

        let second = format!("{uri}?page=2");
        let resp = test::call_service(&app, test::TestRequest::get().uri(&second).to_request()).await;
        assert_eq!(cards(&body_of(resp).await), 3, "{second}");
    }

    // Out of range falls back to the last page, junk to the first.
    let resp = test::call_service(&app, test::TestRequest::get().uri("/?page=99").to_request()).await;
    assert_eq!(cards(&body_of(resp).await), 3);
    let resp = test::call_service(&app, test::TestRequest::get().uri("/?page=abc").to_request()).await;
    assert_eq!(cards(&body_of(resp).await), 10);

    // Repeated keys are not an error; the last one wins.
    let resp =
        test::call_service(&app, test::TestRequest::get().uri("/?page=1&page=2").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(cards(&body_of(resp).await), 3);
}

#[actix_rt::test]
async fn test_profile_shows_total_post_count() {
    let state = state();
    let author = user(&state, "leo").await;
    for i in 0..12 {
        state
            .posts
            .create(NewPost::new(author.id, format!("Пост {i}"), None))
            .await
            .unwrap();
    }
    let app = app!(state);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/profile/leo/").to_request()).await;
    assert!(body_of(resp).await.contains("Всего постов: 12"));
}

#[actix_rt::test]
async fn test_unknown_objects_are_404() {
    let state = state();
    let app = app!(state);

    for uri in [
        "/group/missing/",
        "/profile/nobody/",
        "/posts/999/",
        "/posts/abc/",
        "/unexisting_page/",
    ] {
        let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}

#[actix_rt::test]
async fn test_post_detail_shows_post() {
    let state = state();
    let author = user(&state, "auth").await;
    let g = group(&state, "cats").await;
    let post = state
        .posts
        .create(NewPost::new(author.id, "Про котиков".to_string(), Some(g.id)))
        .await
        .unwrap();
    let app = app!(state);

    let uri = format!("/posts/{}/", post.id);
    let resp = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_of(resp).await;
    assert!(html.contains("Про котиков"));
    assert!(html.contains("/group/cats/"));
    // Anonymous visitors get no edit link.
    assert!(!html.contains("/edit/"));
}

#[actix_rt::test]
async fn test_anonymous_create_redirects_to_login() {
    let state = state();
    let app = app!(state);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/create/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/auth/login/?next=%2Fcreate%2F");

    let req = test::TestRequest::post()
        .uri("/create/")
        .set_form(PostFormData {
            text: "Анонимный пост".to_string(),
            group: None,
        })
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(state.posts.count(&PostQuery::all()).await.unwrap(), 0);
}

#[actix_rt::test]
async fn test_create_post_redirects_to_profile() {
    let state = state();
    let author = user(&state, "auth").await;
    let g = group(&state, "dogs").await;
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/create/")
        .cookie(session(&state, &author))
        .set_form(PostFormData {
            text: "Тестовый текст".to_string(),
            group: Some(g.id.to_string()),
        })
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/profile/auth/");

    let listings = state.posts.list(&PostQuery::all(), 0, 10).await.unwrap();
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].post.text, "Тестовый текст");
    assert_eq!(listings[0].post.author_id, author.id);
    assert_eq!(listings[0].post.group_id, Some(g.id));
}

#[actix_rt::test]
async fn test_create_invalid_form_rerenders() {
    let state = state();
    let author = user(&state, "auth").await;
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/create/")
        .cookie(session(&state, &author))
        .set_form(PostFormData {
            text: "   ".to_string(),
            group: Some("12345".to_string()),
        })
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_of(resp).await.contains(REQUIRED));
    assert_eq!(state.posts.count(&PostQuery::all()).await.unwrap(), 0);
}

#[actix_rt::test]
async fn test_edit_by_author_updates_content_only() {
    let state = state();
    let author = user(&state, "auth").await;
    let g = group(&state, "news").await;
    let post = state
        .posts
        .create(NewPost::new(author.id, "Старый текст".to_string(), None))
        .await
        .unwrap();
    let app = app!(state);
    let uri = format!("/posts/{}/edit/", post.id);

    let req = test::TestRequest::get()
        .uri(&uri)
        .cookie(session(&state, &author))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_of(resp).await.contains("Старый текст"));

    let req = test::TestRequest::post()
        .uri(&uri)
        .cookie(session(&state, &author))
        .set_form(PostFormData {
            text: "Новый текст".to_string(),
            group: Some(g.id.to_string()),
        })
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), format!("/posts/{}/", post.id));

    let updated = state.posts.find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(updated.text, "Новый текст");
    assert_eq!(updated.group_id, Some(g.id));
    assert_eq!(updated.author_id, author.id);
    assert_eq!(updated.pub_date, post.pub_date);
}

#[actix_rt::test]
async fn test_edit_by_non_author_is_ignored() {
    let state = state();
    let author = user(&state, "auth").await;
    let other = user(&state, "other").await;
    let home = group(&state, "home").await;
    let elsewhere = group(&state, "elsewhere").await;
    let post = state
        .posts
        .create(NewPost::new(
            author.id,
            "Не трогать".to_string(),
            Some(home.id),
        ))
        .await
        .unwrap();
    let app = app!(state);
    let uri = format!("/posts/{}/edit/", post.id);

    let req = test::TestRequest::get()
        .uri(&uri)
        .cookie(session(&state, &other))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), format!("/posts/{}/", post.id));

    let req = test::TestRequest::post()
        .uri(&uri)
        .cookie(session(&state, &other))
        .set_form(PostFormData {
            text: "Взлом".to_string(),
            group: Some(elsewhere.id.to_string()),
        })
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), format!("/posts/{}/", post.id));

    let unchanged = state.posts.find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(unchanged.text, "Не трогать");
    assert_eq!(unchanged.group_id, Some(home.id));
    assert_eq!(unchanged.author_id, author.id);
}

#[actix_rt::test]
async fn test_edit_by_author_with_invalid_data_rerenders() {
    let state = state();
    let author = user(&state, "auth").await;
    let g = group(&state, "news").await;
    let post = state
        .posts
        .create(NewPost::new(author.id, "Старый текст".to_string(), Some(g.id)))
        .await
        .unwrap();
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/edit/", post.id))
        .cookie(session(&state, &author))
        .set_form(PostFormData {
            text: "".to_string(),
            group: None,
        })
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_of(resp).await.contains(REQUIRED));

    let unchanged = state.posts.find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(unchanged.text, "Старый текст");
    assert_eq!(unchanged.group_id, Some(g.id));
}

#[actix_rt::test]
async fn test_anonymous_edit_redirects_to_login() {
    let state = state();
    let author = user(&state, "auth").await;
    let post = state
        .posts
        .create(NewPost::new(author.id, "Текст".to_string(), None))
        .await
        .unwrap();
    let app = app!(state);

    let uri = format!("/posts/{}/edit/", post.id);
    let resp = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        location(&resp),
        format!("/auth/login/?next=%2Fposts%2F{}%2Fedit%2F", post.id)
    );
}

#[actix_rt::test]
async fn test_invalid_session_is_cleared() {
    let state = state();
    let app = app!(state);

    let req = test::TestRequest::get()
        .uri("/create/")
        .cookie(Cookie::new(SESSION_COOKIE, "not-a-token"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert!(
        resp.response()
            .cookies()
            .any(|c| c.name() == SESSION_COOKIE && c.value().is_empty())
    );
}

#[actix_rt::test]
async fn test_signup_then_login() {
    let state = state();
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/auth/signup/")
        .set_form(SignupRequest {
            username: "newbie".to_string(),
            password1: PASSWORD.to_string(),
            password2: PASSWORD.to_string(),
        })
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/");
    assert!(state.users.find_by_username("newbie").await.unwrap().is_some());

    let req = test::TestRequest::post()
        .uri("/auth/login/")
        .set_form(LoginRequest {
            username: "newbie".to_string(),
            password: PASSWORD.to_string(),
            next: Some("/create/".to_string()),
        })
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/create/");
    assert!(resp.response().cookies().any(|c| c.name() == SESSION_COOKIE));
}

#[actix_rt::test]
async fn test_signup_rejects_duplicates_and_mismatch() {
    let state = state();
    user(&state, "taken").await;
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/auth/signup/")
        .set_form(SignupRequest {
            username: "taken".to_string(),
            password1: PASSWORD.to_string(),
            password2: "something-else".to_string(),
        })
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_of(resp).await;
    assert!(html.contains("already exists"));
    assert!(html.contains("didn&#x27;t match") || html.contains("didn&#39;t match"));
}

#[actix_rt::test]
async fn test_login_rejects_bad_password_and_foreign_next() {
    let state = state();
    user(&state, "auth").await;
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/auth/login/")
        .set_form(LoginRequest {
            username: "auth".to_string(),
            password: "wrong-password".to_string(),
            next: None,
        })
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_of(resp).await.contains("correct username and password"));

    let req = test::TestRequest::post()
        .uri("/auth/login/")
        .set_form(LoginRequest {
            username: "auth".to_string(),
            password: PASSWORD.to_string(),
            next: Some("https://evil.example/".to_string()),
        })
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(location(&resp), "/");
}

#[actix_rt::test]
async fn test_login_is_rate_limited() {
    let state = state_with(&[("RATE_LIMIT_MAX_REQUESTS", "2")]);
    let app = app!(state);

    let attempt = || {
        test::TestRequest::post()
            .uri("/auth/login/")
            .set_form(LoginRequest {
                username: "ghost".to_string(),
                password: "whatever-it-is".to_string(),
                next: None,
            })
            .to_request()
    };

    for _ in 0..2 {
        let resp = test::call_service(&app, attempt()).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
    let resp = test::call_service(&app, attempt()).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);

    // Page views are not counted.
    let resp = test::call_service(&app, test::TestRequest::get().uri("/auth/login/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn test_logout_clears_session() {
    let state = state();
    let app = app!(state);

    let resp = test::call_service(&app, test::TestRequest::post().uri("/auth/logout/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert!(
        resp.response()
            .cookies()
            .any(|c| c.name() == SESSION_COOKIE && c.value().is_empty())
    );
}

#[actix_rt::test]
async fn test_admin_requires_staff() {
    let state = state();
    let regular = user(&state, "regular").await;
    let app = app!(state);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/admin/posts/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let req = test::TestRequest::get()
        .uri("/admin/posts/")
        .cookie(session(&state, &regular))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_rt::test]
async fn test_admin_post_listing_search_and_placeholder() {
    let state = state();
    let admin = staff(&state, "admin").await;
    state
        .posts
        .create(NewPost::new(admin.id, "Пост про КОТОВ".to_string(), None))
        .await
        .unwrap();
    state
        .posts
        .create(NewPost::new(admin.id, "Пост про собак".to_string(), None))
        .await
        .unwrap();
    let app = app!(state);

    let req = test::TestRequest::get()
        .uri("/admin/posts/?q=%D0%BA%D0%BE%D1%82")
        .cookie(session(&state, &admin))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_of(resp).await;
    assert!(html.contains("Пост про КОТОВ"));
    assert!(!html.contains("Пост про собак"));
    assert!(html.contains(EMPTY_VALUE_DISPLAY));
}

#[actix_rt::test]
async fn test_admin_group_select_offers_blank_choice() {
    let state = state();
    let admin = staff(&state, "admin").await;
    let g = group(&state, "cats").await;
    state
        .posts
        .create(NewPost::new(admin.id, "Про котов".to_string(), Some(g.id)))
        .await
        .unwrap();
    let app = app!(state);

    let req = test::TestRequest::get()
        .uri("/admin/posts/")
        .cookie(session(&state, &admin))
        .to_request();
    let html = body_of(test::call_service(&app, req).await).await;
    assert!(html.contains(r#"<option value="">---------</option>"#));
    assert!(!html.contains(r#"<option value="">Группа cats</option>"#));
    assert!(html.contains(&format!(r#"<option value="{}" selected>Группа cats</option>"#, g.id)));
}

#[actix_rt::test]
async fn test_admin_inline_group_change() {
    let state = state();
    let admin = staff(&state, "admin").await;
    let g = group(&state, "inline").await;
    let post = state
        .posts
        .create(NewPost::new(admin.id, "Без группы".to_string(), None))
        .await
        .unwrap();
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri(&format!("/admin/posts/{}/group/", post.id))
        .cookie(session(&state, &admin))
        .set_form(AdminGroupChange {
            group: Some(g.id.to_string()),
        })
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let updated = state.posts.find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(updated.group_id, Some(g.id));
    assert_eq!(updated.text, "Без группы");
}

#[actix_rt::test]
async fn test_admin_group_creation() {
    let state = state();
    let admin = staff(&state, "admin").await;
    group(&state, "exists").await;
    let app = app!(state);

    let create = |slug: &str| {
        test::TestRequest::post()
            .uri("/admin/groups/")
            .cookie(session(&state, &admin))
            .set_form(GroupFormData {
                title: "Новая группа".to_string(),
                slug: slug.to_string(),
                description: "Описание".to_string(),
            })
            .to_request()
    };

    let resp = test::call_service(&app, create("fresh")).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert!(state.groups.find_by_slug("fresh").await.unwrap().is_some());

    let resp = test::call_service(&app, create("exists")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_of(resp).await.contains("already exists"));
}

#[actix_rt::test]
async fn test_health_reports_in_memory() {
    let state = state();
    let app = app!(state);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_of(resp).await;
    assert!(body.contains("\"database\":\"in-memory\""));
}
