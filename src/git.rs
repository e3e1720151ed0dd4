use std::fs;
use std::path::Path;
use std::process::Command;

use crate::error::Error;

/// Build the arguments for a shallow, single-branch clone.
///
/// With sparse paths the clone skips blobs and starts with an empty sparse
/// checkout; [`clone_shallow`] then selects the paths.
pub fn clone_args(url: &str, branch: &str, target_dir: &Path, sparse: bool) -> Vec<String> {
    let mut args = vec![
        "clone".to_string(),
        "--depth=1".to_string(),
        "--single-branch".to_string(),
        "--branch".to_string(),
        branch.to_string(),
    ];
    if sparse {
        args.push("--filter=blob:none".to_string());
        args.push("--sparse".to_string());
    }
    args.push(url.to_string());
    args.push(target_dir.display().to_string());
    args
}

/// Clone a repository at a specific branch using shallow clone
///
/// This uses the system git command, which automatically handles:
/// - SSH keys from ~/.ssh/
/// - Git credential helpers
/// - Personal access tokens
/// - Any authentication configured in ~/.gitconfig
///
/// A leftover, non-checkout directory at `target_dir` is removed first (git
/// won't clone into an existing non-empty directory).
pub fn clone_shallow(
    url: &str,
    branch: &str,
    target_dir: &Path,
    sparse_paths: &[String],
) -> Result<(), Error> {
    if target_dir.exists() {
        fs::remove_dir_all(target_dir)?;
    }

    if let Some(parent) = target_dir.parent() {
        fs::create_dir_all(parent)?;
    }

    let output = Command::new("git")
        .args(clone_args(url, branch, target_dir, !sparse_paths.is_empty()))
        .output()
        .map_err(|e| Error::GitClone {
            url: url.to_string(),
            r#ref: branch.to_string(),
            message: e.to_string(),
            hint: Some("Make sure git is installed and on PATH".to_string()),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);

        // Provide helpful error message for common failures
        let hint = if stderr.contains("Remote branch") && stderr.contains("not found") {
            Some(format!(
                "Branch '{}' does not exist upstream. Set --cudf-branch or CUDF_BRANCH",
                branch
            ))
        } else if stderr.contains("Could not resolve host")
            || stderr.contains("unable to access")
        {
            Some("Check your network connection, or pass --no-clone to skip the headers".to_string())
        } else if stderr.contains("Authentication failed")
            || stderr.contains("Permission denied")
            || stderr.contains("Could not read from remote repository")
        {
            Some("Make sure you have access to the repository (SSH key, credentials or token)".to_string())
        } else {
            None
        };

        return Err(Error::GitClone {
            url: url.to_string(),
            r#ref: branch.to_string(),
            message: stderr.trim().to_string(),
            hint,
        });
    }

    if !sparse_paths.is_empty() {
        select_sparse_paths(target_dir, sparse_paths)?;
    }

    Ok(())
}

/// Restrict the checkout in `target_dir` to `sparse_paths`.
///
/// On failure the checkout is removed: a clone without its sparse selection
/// would otherwise be reused by the next run with the headers never checked out.
fn select_sparse_paths(target_dir: &Path, sparse_paths: &[String]) -> Result<(), Error> {
    let mut args = vec!["sparse-checkout".to_string(), "set".to_string()];
    args.extend(sparse_paths.iter().cloned());
    if let Err(e) = run_git(target_dir, &args) {
        if let Err(remove) = fs::remove_dir_all(target_dir) {
            log::warn!(
                "Could not remove incomplete checkout {}: {}",
                target_dir.display(),
                remove
            );
        }
        return Err(e);
    }
    Ok(())
}

/// Whether `dir` holds a git checkout.
pub fn is_checkout(dir: &Path) -> bool {
    dir.join(".git").exists()
}

/// Name of the branch checked out in `dir`.
pub fn current_branch(dir: &Path) -> Result<String, Error> {
    let stdout = run_git(
        dir,
        &[
            "rev-parse".to_string(),
            "--abbrev-ref".to_string(),
            "HEAD".to_string(),
        ],
    )?;
    Ok(stdout.trim().to_string())
}

fn run_git(dir: &Path, args: &[String]) -> Result<String, Error> {
    let command = args.join(" ");
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .output()
        .map_err(|e| Error::GitCommand {
            command: command.clone(),
            dir: dir.display().to_string(),
            stderr: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(Error::GitCommand {
            command,
            dir: dir.display().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}
