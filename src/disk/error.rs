// ABOUTME: Error types for disk lookup and provisioning.
// ABOUTME: Returned by DiskManager implementations.

/// Errors from disk manager operations.
#[derive(Debug, thiserror::Error)]
pub enum DiskError {
    /// The provider rejected or failed the request.
    #[error("provider error: {0}")]
    Provider(String),

    /// The recorded current disk no longer exists at the provider.
    #[error("disk not found: {0}")]
    NotFound(String),

    /// The disk pool could not be turned into a provider request.
    #[error("invalid disk specification: {0}")]
    InvalidSpec(String),
}
