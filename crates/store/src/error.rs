//! User-facing submit rejections.
//!
//! `submit` never propagates an unhandled failure: every outcome is either
//! the success message or one of these rejections, whose `Display` text is
//! shown to the user verbatim.

use thiserror::Error;

use crate::remote::RemoteError;

/// Why a submit attempt was rejected.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// No identity is bound; checked before anything else.
    #[error("No user logged in, please sign in first.")]
    NotSignedIn,

    /// Name, base, syrup, or creamer is missing from the selection.
    #[error("Please complete all beverage options and the name before making a beverage.")]
    IncompleteSelection,

    /// The remote write was rejected; local state is untouched.
    #[error("Could not save the beverage: {0}")]
    Remote(#[from] RemoteError),
}
