use askama::Template;

use super::LayoutContext;

#[derive(Debug, Clone, Default)]
pub struct LoginView {
    pub username: String,
    pub next: String,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub view: LayoutContext<LoginView>,
}

#[derive(Debug, Clone, Default)]
pub struct SignupView {
    pub username: String,
    pub username_errors: Vec<String>,
    pub password_errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "auth/signup.html")]
pub struct SignupTemplate {
    pub view: LayoutContext<SignupView>,
}
