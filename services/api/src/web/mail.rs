//! services/api/src/web/mail.rs
//!
//! Builds the "email us" deep link: the native mail app on phones, Gmail's
//! compose page everywhere else.

use crate::web::state::AppState;
use axum::{
    extract::{Query, State},
    http::{header, HeaderMap},
    response::Redirect,
};
use regex::Regex;
use serde::Deserialize;
use std::sync::{Arc, OnceLock};
use utoipa::IntoParams;

fn mobile_agent() -> &'static Regex {
    static MOBILE: OnceLock<Regex> = OnceLock::new();
    MOBILE.get_or_init(|| {
        Regex::new(r"(?i)Android|webOS|iPhone|iPad|iPod|BlackBerry|IEMobile|Opera Mini")
            .expect("mobile user agent pattern is valid")
    })
}

pub fn is_mobile(user_agent: &str) -> bool {
    mobile_agent().is_match(user_agent)
}

/// Empty subject or body parameters are left out of the link.
pub fn compose_link(recipient: &str, subject: &str, body: &str, mobile: bool) -> String {
    let mut link = if mobile {
        let mut link = format!("mailto:{}", recipient);
        if !subject.is_empty() {
            link.push_str(&format!("?subject={}", urlencoding::encode(subject)));
        }
        link
    } else {
        let mut link = format!(
            "https://mail.google.com/mail/?view=cm&fs=1&to={}",
            recipient
        );
        if !subject.is_empty() {
            link.push_str(&format!("&su={}", urlencoding::encode(subject)));
        }
        link
    };
    // mailto links get "&body" even without a subject; mail apps tolerate it
    if !body.is_empty() {
        link.push_str(&format!("&body={}", urlencoding::encode(body)));
    }
    link
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ComposeQuery {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
}

/// GET /contact/compose - Redirect to a pre-filled email to the site owner
#[utoipa::path(
    get,
    path = "/contact/compose",
    params(ComposeQuery),
    responses((status = 303, description = "Redirect to a mail compose link"))
)]
pub async fn compose_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<ComposeQuery>,
) -> Redirect {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let link = compose_link(
        &state.config.contact_email,
        &query.subject,
        &query.body,
        is_mobile(user_agent),
    );
    Redirect::to(&link)
}
