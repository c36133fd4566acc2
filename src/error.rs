use askama::Template;
use askama_axum::IntoResponse as AskamaTemplateResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::planner::PlannerError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("gateway error: {0}")]
    Gateway(String),
    #[error(transparent)]
    Planner(#[from] PlannerError),
    #[error("{0}")]
    BadRequest(String),
    #[error("not found")]
    NotFound,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest(message.into())
    }
}

#[derive(Template)]
#[template(path = "not_found.html")]
struct NotFoundTemplate;

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate {
    title: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound => (
                StatusCode::NOT_FOUND,
                AskamaTemplateResponse::into_response(NotFoundTemplate),
            )
                .into_response(),
            AppError::BadRequest(_) | AppError::Planner(_) => (
                StatusCode::BAD_REQUEST,
                AskamaTemplateResponse::into_response(ErrorTemplate {
                    title: "Please check your input".into(),
                    message: self.to_string(),
                }),
            )
                .into_response(),
            other => {
                error!("request failed: {other:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    AskamaTemplateResponse::into_response(ErrorTemplate {
                        title: "Something went wrong".into(),
                        message: "The request could not be completed. Please try again.".into(),
                    }),
                )
                    .into_response()
            }
        }
    }
}
