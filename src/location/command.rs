//! Position lookup via an external command, e.g. `termux-location` or
//! `CoreLocationCLI --json`. The command must print a JSON object with
//! `latitude` and `longitude` fields on stdout.

use serde::Deserialize;
use tokio::process::Command;

use super::{LocationError, LocationProvider};
use crate::models::Coordinates;

#[derive(Debug, Deserialize)]
struct Position {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Clone)]
pub struct CommandProvider {
    command: String,
}

impl CommandProvider {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl LocationProvider for CommandProvider {
    async fn current_position(&self, _high_accuracy: bool) -> Result<Coordinates, LocationError> {
        // Through the shell, so the configured value may carry its own flags.
        let output = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .output()
            .await
            .map_err(|err| {
                LocationError::Provider(format!("failed to run `{}`: {}", self.command, err))
            })?;

        if !output.status.success() {
            return Err(LocationError::Provider(format!(
                "`{}` exited with {}: {}",
                self.command,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let position: Position = serde_json::from_slice(&output.stdout).map_err(|err| {
            LocationError::Provider(format!("could not parse position output: {}", err))
        })?;
        Ok(Coordinates {
            latitude: position.latitude,
            longitude: position.longitude,
        })
    }
}
