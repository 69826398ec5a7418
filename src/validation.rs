use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use ts_rs::TS;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::{
    error::ApiError,
    models::{LabelChanges, NewLabel},
};

pub const MAX_NAME_CHARS: usize = 50;
pub const MAX_SLUG_CHARS: usize = 60;
// `validator`'s `length` takes `u64` bounds.
const MAX_NAME_CHARS_U64: u64 = MAX_NAME_CHARS as u64;
const MAX_SLUG_CHARS_U64: u64 = MAX_SLUG_CHARS as u64;

/// CreateLabelRequest
///
/// Body of `POST /api/tags` and `POST /api/categories`. When `slug` is omitted
/// it is derived from `name`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS, ToSchema, Default)]
#[serde(deny_unknown_fields)]
#[ts(export)]
pub struct CreateLabelRequest {
    #[validate(
        length(min = 1, max = MAX_NAME_CHARS_U64, message = "Name must be between 1 and 50 characters"),
        custom(function = "validate_not_blank")
    )]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(
        length(min = 1, max = MAX_SLUG_CHARS_U64, message = "Slug must be between 1 and 60 characters"),
        custom(function = "validate_slug")
    )]
    pub slug: Option<String>,
}

/// UpdateLabelRequest
///
/// Body of `PATCH /api/{tags,categories}/{id}`. Both fields are optional; the
/// identifier comes from the path, never from the body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS, ToSchema, Default)]
#[serde(deny_unknown_fields)]
#[ts(export)]
pub struct UpdateLabelRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(
        length(min = 1, max = MAX_NAME_CHARS_U64, message = "Name must be between 1 and 50 characters"),
        custom(function = "validate_not_blank")
    )]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(
        length(min = 1, max = MAX_SLUG_CHARS_U64, message = "Slug must be between 1 and 60 characters"),
        custom(function = "validate_slug")
    )]
    pub slug: Option<String>,
}

impl CreateLabelRequest {
    /// Resolves the slug (explicit or derived from the name) into an insertable label.
    pub fn into_new_label(self) -> Result<NewLabel, ApiError> {
        let name = self.name.trim().to_string();
        let slug = match self.slug {
            Some(slug) => slug,
            None => slugify(&name),
        };
        if slug.is_empty() {
            return Err(ApiError::invalid_field(
                "slug",
                "Slug could not be derived from the name",
            ));
        }
        Ok(NewLabel { name, slug })
    }
}

impl From<UpdateLabelRequest> for LabelChanges {
    fn from(req: UpdateLabelRequest) -> Self {
        LabelChanges {
            name: req.name.map(|name| name.trim().to_string()),
            slug: req.slug,
        }
    }
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("Must not be blank".into()));
    }
    Ok(())
}

/// Slugs are lowercase ASCII alphanumeric words joined by single dashes.
fn validate_slug(value: &str) -> Result<(), ValidationError> {
    if is_valid_slug(value) {
        Ok(())
    } else {
        Err(ValidationError::new("slug").with_message(
            "Slug may only contain lowercase letters, digits and single dashes".into(),
        ))
    }
}

pub fn is_valid_slug(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= MAX_SLUG_CHARS
        && value
            .split('-')
            .all(|word| !word.is_empty() && word.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()))
}

/// Derives a URL-safe slug: lowercase ASCII alphanumerics, everything else
/// collapsed into single dashes, no leading or trailing dash.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;
    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug.truncate(MAX_SLUG_CHARS);
    slug.trim_end_matches('-').to_string()
}

/// ValidJson
///
/// JSON body extractor that runs the payload's `validator` rules. Malformed
/// JSON, unknown fields and rule failures all reject with `ApiError::InvalidInput`
/// (400) instead of axum's default 422/415 plain-text rejections.
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::invalid_field("body", rejection.body_text()))?;
        value.validate()?;
        Ok(ValidJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Rust & Systems"), "rust-systems");
        assert_eq!(slugify("  Hello, World!  "), "hello-world");
        assert_eq!(slugify("C++"), "c");
        assert_eq!(slugify("***"), "");
    }

    #[test]
    fn slug_rules() {
        assert!(is_valid_slug("go"));
        assert!(is_valid_slug("web-dev-2024"));
        assert!(!is_valid_slug("Go"));
        assert!(!is_valid_slug("double--dash"));
        assert!(!is_valid_slug("-leading"));
        assert!(!is_valid_slug("trailing-"));
        assert!(!is_valid_slug("has space"));
    }

    #[test]
    fn update_request_allows_empty_body() {
        let req: UpdateLabelRequest = serde_json::from_str("{}").unwrap();
        assert!(req.validate().is_ok());
        assert!(LabelChanges::from(req).is_empty());
    }

    #[test]
    fn update_request_rejects_unknown_fields() {
        let parsed = serde_json::from_str::<UpdateLabelRequest>(r#"{"id":"t9","name":"x"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn update_request_reports_each_bad_field() {
        let req = UpdateLabelRequest {
            name: Some("   ".into()),
            slug: Some("Not A Slug".into()),
        };
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("slug"));
    }

    #[test]
    fn create_request_derives_slug_from_name() {
        let req = CreateLabelRequest {
            name: " Web Assembly ".into(),
            slug: None,
        };
        let label = req.into_new_label().unwrap();
        assert_eq!(label.name, "Web Assembly");
        assert_eq!(label.slug, "web-assembly");
    }

    #[test]
    fn create_request_rejects_underivable_slug() {
        let req = CreateLabelRequest {
            name: "!!!".into(),
            slug: None,
        };
        assert!(matches!(req.into_new_label(), Err(ApiError::InvalidInput(_))));
    }

    #[test]
    fn length_limits_follow_the_constants() {
        let at_limit = CreateLabelRequest {
            name: "n".repeat(MAX_NAME_CHARS),
            slug: Some("s".repeat(MAX_SLUG_CHARS)),
        };
        assert!(at_limit.validate().is_ok());

        let over_limit = CreateLabelRequest {
            name: "n".repeat(MAX_NAME_CHARS + 1),
            slug: Some("s".repeat(MAX_SLUG_CHARS + 1)),
        };
        let errors = over_limit.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("slug"));
    }
}
