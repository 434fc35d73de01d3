use serde::Serialize;

/// Standardized API response wrapper for all outgoing JSON responses.
///
/// ```json
/// {
///   "success": false,
///   "data": null,
///   "message": "Session not found",
///   "error": "not_found"
/// }
/// ```
///
/// `error` is only present on failures and carries the stable error kind
/// (`validation`, `conflict`, `not_found`, `forbidden`, `unauthorized`, `internal`).
#[derive(Serialize)]
pub struct ApiResponse<T>
where
    T: Serialize,
{
    pub success: bool,
    pub data: T,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    /// Constructs a success response with the given data and message.
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: message.into(),
            error: None,
        }
    }

    /// Constructs an error response with a message and default `data`.
    pub fn error(message: impl Into<String>) -> Self
    where
        T: Default,
    {
        Self {
            success: false,
            data: T::default(),
            message: message.into(),
            error: None,
        }
    }

    /// Error response tagged with a machine-readable kind.
    pub fn failure(kind: &'static str, message: impl Into<String>) -> Self
    where
        T: Default,
    {
        Self {
            error: Some(kind),
            ..Self::error(message)
        }
    }
}
