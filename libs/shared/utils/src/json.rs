use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};

use shared_models::error::AppError;

/// `Json` body extractor whose rejections go through `AppError`, so a missing
/// or mistyped field answers 400 with the usual `{"error": ...}` body.
#[derive(Debug)]
pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use axum::{body::Body, http::header::CONTENT_TYPE};
    use serde_json::{json, Value};

    fn request(body: &str) -> Request {
        Request::builder()
            .method("POST")
            .uri("/")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn valid_body_is_extracted() {
        let AppJson(value) = AppJson::<Value>::from_request(request(r#"{"slot":"9am"}"#), &())
            .await
            .unwrap();
        assert_eq!(value, json!({ "slot": "9am" }));
    }

    #[tokio::test]
    async fn syntax_errors_are_bad_requests() {
        let result = AppJson::<Value>::from_request(request("{not json"), &()).await;
        assert_matches!(result, Err(AppError::BadRequest(_)));
    }
}
