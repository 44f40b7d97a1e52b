use std::{collections::HashMap, convert::Infallible};

use axum::{
    Form, Json,
    extract::{FromRequest, Request},
    http::header,
};
use serde_json::{Map, Value};

use crate::infra::errors::AppError;

/// Raw profile edit body. Accepts JSON or a URL-encoded form; both end up as
/// a JSON object so one parser handles them.
///
/// Never rejects the request: a body that fails to decode is kept as an
/// error and only surfaces when the handler asks for it, after the account
/// and ownership checks have run.
#[derive(Debug)]
pub struct ProfileChangePayload(Result<Value, AppError>);

impl ProfileChangePayload {
    pub fn into_json(self) -> Result<Value, AppError> {
        self.0
    }
}

impl<S> FromRequest<S> for ProfileChangePayload
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(decode(req, state).await))
    }
}

async fn decode<S>(req: Request, state: &S) -> Result<Value, AppError>
where
    S: Send + Sync,
{
    if is_form(&req) {
        let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::bad_request(rejection.body_text()))?;

        let object: Map<String, Value> = fields
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect();
        return Ok(Value::Object(object));
    }

    let Json(body) = Json::<Value>::from_request(req, state)
        .await
        .map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
    Ok(body)
}

fn is_form(req: &Request) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|content_type| {
            content_type.starts_with("application/x-www-form-urlencoded")
        })
}
