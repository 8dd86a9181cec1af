//! Query string extractor that never rejects a request.
//!
//! `web::Query` fails on repeated keys; listings instead take the last value
//! of each key and ignore anything they do not know about.

use actix_web::{FromRequest, HttpRequest, dev::Payload};
use std::future::{Ready, ready};
use std::ops::Deref;

use yatube_shared::dto::{AdminPostQuery, NextQuery, PageQuery};

/// Query types that can be filled one key at a time.
pub trait FromQueryPairs: Default {
    fn set(&mut self, key: &str, value: String);
}

impl FromQueryPairs for PageQuery {
    fn set(&mut self, key: &str, value: String) {
        if key == "page" {
            self.page = Some(value);
        }
    }
}

impl FromQueryPairs for AdminPostQuery {
    fn set(&mut self, key: &str, value: String) {
        match key {
            "q" => self.q = Some(value),
            "pub_date" => self.pub_date = Some(value),
            "page" => self.page = Some(value),
            _ => {}
        }
    }
}

impl FromQueryPairs for NextQuery {
    fn set(&mut self, key: &str, value: String) {
        if key == "next" {
            self.next = Some(value);
        }
    }
}

/// Last-value-wins query extractor.
#[derive(Debug)]
pub struct LenientQuery<T>(pub T);

impl<T> LenientQuery<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for LenientQuery<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: FromQueryPairs> LenientQuery<T> {
    pub fn parse(query_string: &str) -> Self {
        let mut value = T::default();
        for (key, v) in url::form_urlencoded::parse(query_string.as_bytes()) {
            value.set(&key, v.into_owned());
        }
        LenientQuery(value)
    }
}

impl<T: FromQueryPairs> FromRequest for LenientQuery<T> {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(Self::parse(req.query_string())))
    }
}
