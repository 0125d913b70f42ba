//! Folds the outcome of each pipeline stage into one result.
//!
//! # Design
//! Construction, dispatch and decode failures are handed in independently;
//! a stage that did not run passes `None`. Dispatch covers both transport
//! failures and error statuses reported by the server, so that slot is
//! already an [`Error`]. The first failure in pipeline order is reported.
//! A success value is only returned when no stage failed.

use tracing::debug;

use crate::error::{ConstructionError, DecodeError, Error};

pub fn resolve<T>(
    value: Option<T>,
    construction: Option<ConstructionError>,
    dispatch: Option<Error>,
    decode: Option<DecodeError>,
) -> Result<T, Error> {
    let mut failures = construction
        .map(Error::from)
        .into_iter()
        .chain(dispatch)
        .chain(decode.map(Error::from));

    match failures.next() {
        Some(first) => {
            for masked in failures {
                debug!(error = %masked, "stage error masked by an earlier failure");
            }
            Err(first)
        }
        None => value.ok_or(Error::Decode(DecodeError::Missing)),
    }
}
