//! Delete request model for asynchronous soft deletion.

use std::collections::HashSet;

/// A request to soft-delete some of an owner's short codes.
///
/// Created by the delete handler and sent through the bounded queue of
/// [`crate::domain::deletion_worker::DeletionPipeline`]. Once enqueued, only the
/// background worker touches it.
///
/// Codes are kept as a set, so submitting the same code twice in one request
/// costs a single update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteRequest {
    pub owner_id: String,
    pub codes: HashSet<String>,
}

impl DeleteRequest {
    /// Creates a new delete request, dropping blank and duplicate codes.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let request = DeleteRequest::new("owner-1", ["abc12", "abc12", " "]);
    /// assert_eq!(request.len(), 1);
    /// ```
    pub fn new<I, S>(owner_id: impl Into<String>, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            owner_id: owner_id.into(),
            codes: codes
                .into_iter()
                .map(Into::into)
                .map(|code| code.trim().to_string())
                .filter(|code| !code.is_empty())
                .collect(),
        }
    }

    /// Number of distinct codes in the request.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}
