//! Callback-style routing backends.

use crate::LngLat;
use crate::path::RoutePayload;

/// Parameters of one backend search.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    /// First location.
    pub origin: LngLat,
    /// Last location.
    pub destination: LngLat,
    /// Intermediate locations, empty for transit.
    pub waypoints: Vec<LngLat>,
    /// Region scope for transit searches.
    pub scope: Option<String>,
}

/// Status tag a backend reports with its single callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchStatus {
    /// The search produced a result.
    Complete,
    /// The search failed.
    Error,
    /// The search ran but found nothing.
    NoData,
    /// Any other tag, passed through verbatim.
    Other(String),
}

impl SearchStatus {
    /// Parse a backend status tag.
    ///
    /// # Examples
    /// ```
    /// use tripmap_core::provider::SearchStatus;
    ///
    /// assert_eq!(SearchStatus::from_tag("no_data"), SearchStatus::NoData);
    /// assert_eq!(
    ///     SearchStatus::from_tag("pending"),
    ///     SearchStatus::Other("pending".to_string())
    /// );
    /// ```
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "complete" => Self::Complete,
            "error" => Self::Error,
            "no_data" => Self::NoData,
            other => Self::Other(other.to_owned()),
        }
    }

    /// The status tag.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Complete => "complete",
            Self::Error => "error",
            Self::NoData => "no_data",
            Self::Other(tag) => tag,
        }
    }
}

impl std::fmt::Display for SearchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data handed to the search callback alongside the status.
#[derive(Debug, Clone)]
pub enum SearchPayload {
    /// Route candidates, normally paired with [`SearchStatus::Complete`].
    Routes(RoutePayload),
    /// A diagnostic message, normally paired with an error status.
    Diagnostic(String),
    /// Nothing at all.
    Empty,
}

impl SearchPayload {
    /// Diagnostic text carried by the payload, if any.
    #[must_use]
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            Self::Routes(payload) => payload.info.as_deref(),
            Self::Diagnostic(message) => Some(message),
            Self::Empty => None,
        }
    }
}

/// Completion callback invoked exactly once per search.
pub type SearchCallback = Box<dyn FnOnce(SearchStatus, SearchPayload) + Send + 'static>;

/// A loaded routing capability for one mode.
pub trait RouteBackend: Send + Sync {
    /// Start a search; `callback` is invoked once when it completes.
    ///
    /// Backends may invoke the callback before returning or later from
    /// another task.
    fn search(&self, request: RouteRequest, callback: SearchCallback);
}
