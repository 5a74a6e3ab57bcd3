// HTTP request handlers
use crate::application::session_service::Session;
use crate::application::temperature_page_service::ChartOutcome;
use crate::domain::chart::Trigger;
use crate::infrastructure::html_page::{
    load_stylesheet, render_error_page, render_temperature_page, ChartBody,
};
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Form, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "dashboard_session";
pub const TEMPERATURE_PAGE: &str = "/temperature";

#[derive(Deserialize)]
pub struct SelectChartForm {
    pub chart: Trigger,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn index() -> Redirect {
    Redirect::to(TEMPERATURE_PAGE)
}

/// Render the temperature page for the caller's current selection
pub async fn temperature_page(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let session = state
        .session_service
        .resolve(session_id_from_headers(&headers))
        .await;
    let chrome = state.page_chrome().await;

    let response = match state.page_service.view(session.selection).await {
        Ok(view) => {
            let body = match &view.outcome {
                ChartOutcome::Ready { chart } => match state.svg_renderer.render(chart) {
                    Ok(svg) => ChartBody::Svg(svg),
                    Err(e) => {
                        tracing::error!("Failed to draw {:?} chart: {}", view.selection, e);
                        ChartBody::Empty(e.to_string())
                    }
                },
                ChartOutcome::Empty { message } => ChartBody::Empty(message.clone()),
            };
            Html(render_temperature_page(&chrome, view.selection, &body)).into_response()
        }
        Err(e) => {
            tracing::error!(
                "Error loading {}: {}",
                state.page_service.data_path().display(),
                e
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(render_error_page(&chrome, &e.to_string())),
            )
                .into_response()
        }
    };

    with_session_cookie(response, &session)
}

/// Apply one trigger to the caller's session, then send them back to the page
pub async fn select_chart(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Form(form): Form<SelectChartForm>,
) -> Response {
    let session = state
        .session_service
        .resolve(session_id_from_headers(&headers))
        .await;
    let selection = state.session_service.apply(session.id, form.chart).await;

    tracing::debug!(
        "Session {} now shows {:?} ({} sessions open)",
        session.id,
        selection,
        state.session_service.session_count().await
    );

    with_session_cookie(Redirect::to(TEMPERATURE_PAGE).into_response(), &session)
}

/// Chart description for the caller's current selection, as JSON
pub async fn chart_description(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let session = state
        .session_service
        .resolve(session_id_from_headers(&headers))
        .await;

    let response = match state.page_service.view(session.selection).await {
        Ok(view) => Json(view).into_response(),
        Err(e) => {
            tracing::error!("Error building chart description: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    };

    with_session_cookie(response, &session)
}

pub async fn stylesheet(State(state): State<Arc<AppState>>) -> Response {
    match load_stylesheet(&state.page_settings.stylesheet).await {
        Some(css) => ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], css).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

fn session_id_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value).ok())
}

fn with_session_cookie(mut response: Response, session: &Session) -> Response {
    if session.created {
        let cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            SESSION_COOKIE, session.id
        );
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }
    response
}
