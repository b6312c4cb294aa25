//! Pluggable position lookup for tagging a visit with GPS coordinates.
//!
//! Providers answer exactly one position request; there is no watch or
//! subscription. The 12-second deadline lives at the call site, not in the
//! providers.

use std::time::Duration;
use thiserror::Error;

use crate::models::Coordinates;

/// How long a provider gets to produce a fix before the request fails.
pub const POSITION_TIMEOUT: Duration = Duration::from_secs(12);

#[derive(Debug, Error)]
pub enum LocationError {
    #[error("no location provider is configured")]
    Unavailable,
    #[error("timed out waiting for a position fix")]
    TimedOut,
    #[error("location provider failed: {0}")]
    Provider(String),
}

#[allow(async_fn_in_trait)]
pub trait LocationProvider {
    /// One-shot position request. The hint asks for the best fix the
    /// provider can manage; providers without accuracy tiers ignore it.
    async fn current_position(&self, high_accuracy: bool) -> Result<Coordinates, LocationError>;
}

/// Request a position with the high-accuracy hint set, failing after
/// `POSITION_TIMEOUT` if the provider has not answered.
pub async fn acquire<P: LocationProvider>(provider: &P) -> Result<Coordinates, LocationError> {
    acquire_within(provider, POSITION_TIMEOUT).await
}

async fn acquire_within<P: LocationProvider>(
    provider: &P,
    deadline: Duration,
) -> Result<Coordinates, LocationError> {
    match tokio::time::timeout(deadline, provider.current_position(true)).await {
        Ok(result) => result,
        Err(_) => Err(LocationError::TimedOut),
    }
}

mod command;
mod noop;

pub use command::CommandProvider;
pub use noop::NoProvider;

#[cfg(test)]
mod tests {
    use super::*;

    struct NeverAnswers;

    impl LocationProvider for NeverAnswers {
        async fn current_position(&self, _: bool) -> Result<Coordinates, LocationError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            unreachable!("the request must time out first")
        }
    }

    #[tokio::test]
    async fn acquire_times_out_when_no_fix_arrives() {
        let err = acquire_within(&NeverAnswers, Duration::from_millis(10))
            .await
            .expect_err("must time out");
        assert!(matches!(err, LocationError::TimedOut));
    }

    #[tokio::test]
    async fn acquire_passes_a_fix_through() {
        struct Fixed;
        impl LocationProvider for Fixed {
            async fn current_position(&self, _: bool) -> Result<Coordinates, LocationError> {
                Ok(Coordinates {
                    latitude: 47.62,
                    longitude: -122.35,
                })
            }
        }

        let coords = acquire(&Fixed).await.expect("fix");
        assert_eq!(coords.latitude, 47.62);
        assert_eq!(coords.longitude, -122.35);
    }
}
