// ABOUTME: Error types for disk deployment with SNAFU context selectors.
// ABOUTME: Each variant names the phase that failed; attach errors pass through untouched.

use snafu::Snafu;

use crate::config::PropertyError;
use crate::disk::DiskError;
use crate::vm::VmError;

/// Errors that abort a disk deployment.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(super)))]
pub enum DeployError {
    #[snafu(display("finding existing disk: {source}"))]
    FindCurrent { source: DiskError },

    #[snafu(display("creating new disk: {source}"))]
    CreateDisk { source: DiskError },

    /// Attach failures carry no extra context so callers see the VM error as-is.
    #[snafu(transparent)]
    AttachDisk { source: VmError },

    #[snafu(display("getting disk pool cloud properties: {source}"))]
    ResolveCloudProperties { source: PropertyError },

    #[snafu(display("creating secondary disk: {source}"))]
    CreateSecondaryDisk { source: DiskError },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployErrorKind {
    /// Locating the current disk failed.
    Lookup,
    /// Creating a disk (initial or replacement) failed.
    Provisioning,
    /// Attaching the disk to the VM failed.
    Attachment,
    /// Resolving the desired cloud properties failed.
    SpecificationResolution,
}

impl DeployError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> DeployErrorKind {
        match self {
            DeployError::FindCurrent { .. } => DeployErrorKind::Lookup,
            DeployError::CreateDisk { .. } | DeployError::CreateSecondaryDisk { .. } => {
                DeployErrorKind::Provisioning
            }
            DeployError::AttachDisk { .. } => DeployErrorKind::Attachment,
            DeployError::ResolveCloudProperties { .. } => DeployErrorKind::SpecificationResolution,
        }
    }

    /// The VM error behind an attach failure.
    pub fn attach_error(&self) -> Option<&VmError> {
        match self {
            DeployError::AttachDisk { source } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attach_error_displays_verbatim() {
        let vm_err = VmError::NotFound("vm-1".to_string());
        let err = DeployError::from(vm_err.clone());
        assert_eq!(err.to_string(), vm_err.to_string());
        assert_eq!(err.attach_error(), Some(&vm_err));
        assert_eq!(err.kind(), DeployErrorKind::Attachment);
    }

    #[test]
    fn wrapped_errors_keep_underlying_message() {
        let err = DeployError::CreateSecondaryDisk {
            source: DiskError::Provider("quota exceeded".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "creating secondary disk: provider error: quota exceeded"
        );
        assert_eq!(err.kind(), DeployErrorKind::Provisioning);
        assert!(err.attach_error().is_none());
    }
}
