// ABOUTME: Type-safe identifiers for provider-assigned resources.
// ABOUTME: Uses phantom types so disk and VM ids cannot be swapped.

mod id;

pub use id::{DiskCid, Id, VmCid};
