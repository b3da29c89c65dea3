//! Password acquisition at the CLI boundary.
//!
//! The engine treats passwords as borrowed secrets; this module is where
//! they enter the process. Priority order: `--key` flag, the
//! `GOINGENV_PASSWORD` environment variable (with a warning, since
//! environment variables can be visible to other processes), then an
//! interactive hidden prompt.

use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use secrecy::SecretString;
use zeroize::Zeroize;

/// Environment variable consulted before prompting.
pub const PASSWORD_ENV: &str = "GOINGENV_PASSWORD";

/// Resolves the password for an operation.
///
/// `confirm` requests a second prompt (interactive input only) and
/// requires both entries to match; pack uses this so a typo cannot
/// produce an archive nobody can open.
pub fn acquire(key: Option<&str>, prompt: &str, confirm: bool) -> Result<SecretString> {
    if let Some(key) = key {
        if key.is_empty() {
            bail!("password cannot be empty");
        }
        return Ok(SecretString::from(key.to_string()));
    }

    if let Ok(value) = std::env::var(PASSWORD_ENV) {
        if !value.is_empty() {
            eprintln!("Warning: using password from environment variable '{PASSWORD_ENV}'");
            eprintln!("         environment variables may be visible to other processes");
            return Ok(SecretString::from(value));
        }
    }

    let mut entered =
        rpassword::prompt_password(prompt).context("failed to read password")?;
    if entered.is_empty() {
        bail!("password cannot be empty");
    }

    if confirm {
        let mut again = rpassword::prompt_password("Confirm password: ")
            .context("failed to read password confirmation")?;
        let matches = entered == again;
        again.zeroize();
        if !matches {
            entered.zeroize();
            bail!("passwords do not match");
        }
    }

    Ok(SecretString::from(entered))
}
