//! Access gate: proof of holding the physical tag.
//!
//! The tracking code is compared entirely inside this client against a value
//! baked into the distributed binary, and the unlock survives restarts via a
//! small JSON state file. This is a social deterrent against logging a visit
//! without the tag in hand; it is not an access-control boundary, and no
//! server ever verifies the code.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GateError {
    #[error("could not read unlock state: {0}")]
    Read(std::io::Error),
    #[error("could not persist unlock state: {0}")]
    Write(std::io::Error),
    #[error("could not encode unlock state: {0}")]
    Encode(serde_json::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct GateFile {
    unlock_token: String,
}

#[derive(Debug)]
pub struct Gate {
    unlocked: bool,
    secret: String,
    state_file: PathBuf,
}

impl Gate {
    /// Read persisted unlock state. A missing file, a corrupt file, or a
    /// stale token all count as locked.
    pub fn load(state_file: PathBuf, secret: &str) -> Result<Self, GateError> {
        let secret = secret.trim().to_uppercase();
        let unlocked = match fs::read_to_string(&state_file) {
            Ok(contents) => match serde_json::from_str::<GateFile>(&contents) {
                Ok(state) => state.unlock_token == secret,
                Err(err) => {
                    tracing::debug!(
                        "ignoring corrupt unlock state {}: {}",
                        state_file.display(),
                        err
                    );
                    false
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => false,
            Err(err) => return Err(GateError::Read(err)),
        };
        Ok(Self {
            unlocked,
            secret,
            state_file,
        })
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    /// Compare a hand-entered code against the tag secret, ignoring case and
    /// surrounding whitespace. A match persists the token and unlocks; a
    /// mismatch changes nothing and reports failure to the caller.
    pub fn unlock(&mut self, candidate: &str) -> Result<bool, GateError> {
        if candidate.trim().to_uppercase() != self.secret {
            return Ok(false);
        }
        let payload = serde_json::to_string_pretty(&GateFile {
            unlock_token: self.secret.clone(),
        })
        .map_err(GateError::Encode)?;
        if let Some(parent) = self.state_file.parent() {
            fs::create_dir_all(parent).map_err(GateError::Write)?;
        }
        fs::write(&self.state_file, payload).map_err(GateError::Write)?;
        self.unlocked = true;
        Ok(true)
    }

    /// Clear the persisted token. Succeeds whether or not one was stored.
    pub fn lock(&mut self) -> Result<(), GateError> {
        match fs::remove_file(&self.state_file) {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => return Err(GateError::Write(err)),
        }
        self.unlocked = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "D98MYP";

    fn temp_state_file(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("tblog_gate_{}_{}.json", tag, rand::random::<u64>()))
    }

    #[test]
    fn unlock_trims_and_uppercases_the_candidate() {
        let path = temp_state_file("unlock");
        let mut gate = Gate::load(path.clone(), SECRET).expect("load gate");
        assert!(!gate.is_unlocked());

        assert!(gate.unlock("  d98myp ").expect("unlock"));
        assert!(gate.is_unlocked());
        assert!(path.exists());

        // Unlock survives a restart.
        let reloaded = Gate::load(path.clone(), SECRET).expect("reload gate");
        assert!(reloaded.is_unlocked());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn mismatch_changes_nothing_and_persists_nothing() {
        let path = temp_state_file("mismatch");
        let mut gate = Gate::load(path.clone(), SECRET).expect("load gate");

        assert!(!gate.unlock("WRONG1").expect("unlock attempt"));
        assert!(!gate.is_unlocked());
        assert!(!path.exists());
    }

    #[test]
    fn lock_clears_the_token_idempotently() {
        let path = temp_state_file("lock");
        let mut gate = Gate::load(path.clone(), SECRET).expect("load gate");
        assert!(gate.unlock(SECRET).expect("unlock"));

        gate.lock().expect("lock");
        assert!(!gate.is_unlocked());
        assert!(!path.exists());

        // Locking again is a no-op, not an error.
        gate.lock().expect("second lock");
        assert!(!gate.is_unlocked());
    }

    #[test]
    fn stale_or_corrupt_state_counts_as_locked() {
        let stale = temp_state_file("stale");
        fs::write(&stale, r#"{"unlock_token":"OLDTAG"}"#).expect("write stale state");
        let gate = Gate::load(stale.clone(), SECRET).expect("load gate");
        assert!(!gate.is_unlocked());
        let _ = fs::remove_file(&stale);

        let corrupt = temp_state_file("corrupt");
        fs::write(&corrupt, "not json").expect("write corrupt state");
        let gate = Gate::load(corrupt.clone(), SECRET).expect("load gate");
        assert!(!gate.is_unlocked());
        let _ = fs::remove_file(&corrupt);
    }
}
