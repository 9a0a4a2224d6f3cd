//! Portal session errors.

use hb_core::RegionCode;
use hb_state::{GateError, MarkerStoreError};
use thiserror::Error;

/// Errors surfaced by [`crate::PortalSession`].
#[derive(Error, Debug)]
pub enum SessionError {
    /// A gate operation was requested with no region selected.
    #[error("no region is selected")]
    NoSelection,

    /// The selected region is live and has no registration gate.
    #[error("region {0} is live and is not gated")]
    NotGated(RegionCode),

    /// Gate misuse or marker failure inside the gate.
    #[error(transparent)]
    Gate(#[from] GateError),

    /// The marker store could not be read.
    #[error(transparent)]
    Marker(#[from] MarkerStoreError),
}
