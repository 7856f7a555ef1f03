//! OpenAPI schema definitions for the error payload.
//!
//! The domain error stays free of framework derives; these wrappers mirror
//! its serialised shape for documentation only.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// Malformed input or a failed business rule.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Bearer credential missing or rejected.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Authenticated but not the owner.
    #[schema(rename = "forbidden")]
    Forbidden,
    #[schema(rename = "not_found")]
    NotFound,
    /// A backing store is unreachable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    #[schema(example = "forbidden")]
    code: ErrorCodeSchema,
    #[schema(example = "request no permission")]
    message: String,
    /// Correlates the response with server logs.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    details: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::PartialSchema;

    fn schema_json<T: PartialSchema>() -> String {
        serde_json::to_string(&T::schema()).expect("schema serialises to JSON")
    }

    #[test]
    fn error_schema_uses_wire_field_names() {
        let json = schema_json::<ErrorSchema>();
        assert_eq!(ErrorSchema::name(), "crate.domain.Error");
        assert!(json.contains("traceId"), "schema: {json}");
        assert!(json.contains("message"), "schema: {json}");
    }

    #[test]
    fn error_code_schema_lists_every_code() {
        let json = schema_json::<ErrorCodeSchema>();
        for code in [
            "invalid_request",
            "unauthorized",
            "forbidden",
            "not_found",
            "service_unavailable",
            "internal_error",
        ] {
            assert!(json.contains(code), "missing {code}");
        }
    }
}
