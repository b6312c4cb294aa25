//! Fallback provider for setups with no way to get a fix.

use super::{LocationError, LocationProvider};
use crate::models::Coordinates;

pub struct NoProvider;

impl LocationProvider for NoProvider {
    async fn current_position(&self, _high_accuracy: bool) -> Result<Coordinates, LocationError> {
        Err(LocationError::Unavailable)
    }
}
