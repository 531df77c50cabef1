//! Export of composed images.

/// PNG export of [`crate::OutputImage`].
pub mod png;
