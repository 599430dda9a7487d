use axum::{
    extract::{Path, Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use notion_portfolio::{
    portfolio::{Affiliations, Content, Experiences, Links, Profile, Projects},
    response::NotionId,
    Portfolio,
};
use std::sync::Arc;

type Shared = State<Arc<Portfolio>>;

pub fn router(portfolio: Arc<Portfolio>) -> Router {
    Router::new()
        .route("/api/v1/profile", get(profile))
        .route("/api/v1/links", get(links))
        .route("/api/v1/content/{page_id}", get(content))
        .route("/api/v1/experience", get(experience))
        .route("/api/v1/projects", get(projects))
        .route("/api/v1/affiliations", get(affiliations))
        .with_state(portfolio)
        .layer(middleware::from_fn(cors))
}

async fn cors(request: Request, next: Next) -> Response {
    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(request).await
    };

    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type, Authorization"),
    );

    response
}

/// Any failure becomes a 500 carrying the error chain as plain text
struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        log::error!("{:?}", self.0);
        (StatusCode::INTERNAL_SERVER_ERROR, format!("{:#}", self.0)).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError(error)
    }
}

async fn profile(State(portfolio): Shared) -> Result<Json<Profile>, AppError> {
    Ok(Json(portfolio.profile().await?))
}

async fn links(State(portfolio): Shared) -> Result<Json<Links>, AppError> {
    Ok(Json(portfolio.links().await?))
}

async fn content(
    State(portfolio): Shared,
    Path(page_id): Path<NotionId>,
) -> Result<Json<Content>, AppError> {
    Ok(Json(portfolio.content(page_id).await?))
}

async fn experience(State(portfolio): Shared) -> Result<Json<Experiences>, AppError> {
    Ok(Json(portfolio.experience().await?))
}

async fn projects(State(portfolio): Shared) -> Result<Json<Projects>, AppError> {
    Ok(Json(portfolio.projects().await?))
}

async fn affiliations(State(portfolio): Shared) -> Result<Json<Affiliations>, AppError> {
    Ok(Json(portfolio.affiliations().await?))
}
