//! Ownership normalization of the cache directory.
//!
//! The cache directory may be a host-mounted volume written by another
//! identity between runs, so every local restore and save starts by taking
//! ownership of it again.

use async_trait::async_trait;
use hoard_core::ports::OwnershipNormalizer;
use hoard_core::{Error, Result};
use std::path::Path;
use tokio::process::Command;
use tracing::{debug, info};

/// Runs a recursive `chown` to the current user through a privileged launcher.
///
/// A cache directory that does not exist yet is left alone and reported as
/// success: the pipeline creates it afterwards as the current user, and its
/// parents are never chowned. The next call on the existing directory runs
/// the command as usual.
#[derive(Debug, Clone)]
pub struct ChownCommand {
    launcher: Vec<String>,
}

impl ChownCommand {
    /// `sudo chown -R <user> <dir>`.
    pub fn sudo() -> Self {
        Self::with_launcher(["sudo", "chown"])
    }

    /// Use a custom launcher; `-R <user> <dir>` is appended to it.
    pub fn with_launcher<I, S>(launcher: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            launcher: launcher.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for ChownCommand {
    fn default() -> Self {
        Self::sudo()
    }
}

/// Name of the user running this process.
pub async fn current_user() -> Result<String> {
    let output = Command::new("id")
        .arg("-un")
        .output()
        .await
        .map_err(|e| Error::Internal(format!("Failed to run id: {}", e)))?;
    if !output.status.success() {
        return Err(Error::Internal(format!(
            "id -un exited with {}",
            output.status
        )));
    }
    let user = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if user.is_empty() {
        return Err(Error::Internal("id -un returned an empty user name".into()));
    }
    Ok(user)
}

#[async_trait]
impl OwnershipNormalizer for ChownCommand {
    async fn ensure_ownership(&self, directory: &Path) -> Result<()> {
        let (program, args) = self
            .launcher
            .split_first()
            .ok_or_else(|| Error::Config("Ownership launcher is empty".into()))?;

        // Not created yet: the pipeline creates it later under our own identity.
        if !tokio::fs::try_exists(directory).await? {
            debug!(directory = %directory.display(), "Cache directory missing, nothing to own");
            return Ok(());
        }

        let user = current_user().await?;

        debug!(user = %user, directory = %directory.display(), "Taking ownership of cache directory");

        let status = Command::new(program)
            .args(args)
            .arg("-R")
            .arg(&user)
            .arg(directory)
            .status()
            .await
            .map_err(|e| Error::Internal(format!("Failed to spawn {}: {}", program, e)))?;

        // A signal-terminated process has no exit code.
        let exit_code = status.code().unwrap_or(-1);
        if exit_code != 0 {
            return Err(Error::Permission {
                exit_code,
                message: format!(
                    "{} -R {} {}",
                    self.launcher.join(" "),
                    user,
                    directory.display()
                ),
            });
        }
        Ok(())
    }
}

/// Leaves ownership untouched, for hosts where the directory is always ours.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkipOwnership;

#[async_trait]
impl OwnershipNormalizer for SkipOwnership {
    async fn ensure_ownership(&self, directory: &Path) -> Result<()> {
        info!(directory = %directory.display(), "Skipping ownership normalization");
        Ok(())
    }
}
