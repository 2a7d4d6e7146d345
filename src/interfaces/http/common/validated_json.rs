//! JSON body extractor that also runs `validator` rules.
//!
//! Malformed bodies become 400, rule violations 422, both in the
//! `{statusCode, message}` error shape. Violations are reported under the
//! camelCase names clients send, sorted by field.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use super::ErrorResponse;

/// `Json<T>` that rejects bodies failing `T::validate()`.
///
/// ```ignore
/// async fn create_spot(
///     State(state): State<ParkingState>,
///     ValidatedJson(body): ValidatedJson<CreateSpotRequest>,
/// ) -> Result<(StatusCode, Json<CreateSpotResponse>), ApiError> { ... }
/// ```
pub struct ValidatedJson<T>(pub T);

pub enum ValidatedJsonRejection {
    Malformed(JsonRejection),
    Invalid(ValidationErrors),
}

/// `parking_spot_id` -> `parkingSpotId`
fn wire_name(field: &str) -> String {
    let mut name = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            name.extend(c.to_uppercase());
            upper = false;
        } else {
            name.push(c);
        }
    }
    name
}

fn describe(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|(a, _), (b, _)| a.cmp(b));

    let parts: Vec<String> = fields
        .into_iter()
        .flat_map(|(field, errs)| {
            let field = wire_name(&field);
            errs.iter().map(move |e| match &e.message {
                Some(msg) => format!("{}: {}", field, msg),
                None => match (e.params.get("min"), e.params.get("max")) {
                    (Some(min), Some(max)) if e.code == "length" => {
                        format!("{} must be between {} and {} characters", field, min, max)
                    }
                    _ => format!("{}: {}", field, e.code),
                },
            })
        })
        .collect();

    if parts.is_empty() {
        "Validation failed".to_string()
    } else {
        parts.join("; ")
    }
}

impl IntoResponse for ValidatedJsonRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Malformed(rejection) => (
                StatusCode::BAD_REQUEST,
                format!("Invalid JSON: {}", rejection.body_text()),
            ),
            Self::Invalid(errors) => (StatusCode::UNPROCESSABLE_ENTITY, describe(&errors)),
        };
        ErrorResponse::new(status, message).into_response_with(status)
    }
}

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ValidatedJsonRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(ValidatedJsonRejection::Malformed)?;
        value.validate().map_err(ValidatedJsonRejection::Invalid)?;
        Ok(ValidatedJson(value))
    }
}
