//! Publishes the dataset by committing it into a git repository.

use crate::config::{PublishConfig, Secret};
use crate::error::PriceError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;
use std::io::Write;
use std::path::{Component, Path};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Result of one publish attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum PublishOutcome {
    /// A new commit was pushed.
    Published { message: String },
    /// The committed file already had identical content.
    Unchanged,
    /// Publishing was not attempted.
    Skipped(PriceError),
}

impl fmt::Display for PublishOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublishOutcome::Published { message } => write!(f, "published ({})", message),
            PublishOutcome::Unchanged => write!(f, "unchanged, nothing to commit"),
            PublishOutcome::Skipped(reason) => write!(f, "{}", reason),
        }
    }
}

/// Trait for dataset sinks - enables mocking for tests.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Stores `content` as the current dataset.
    async fn publish(&self, content: &[u8]) -> Result<PublishOutcome>;
}

/// Clones the target repository, replaces the dataset file, commits and pushes.
pub struct GitPublisher {
    repo_url: Option<String>,
    token: Option<Secret>,
    output_path: String,
    author_name: String,
    author_email: String,
}

impl GitPublisher {
    /// Creates a publisher from the publish settings.
    pub fn new(config: &PublishConfig) -> Self {
        Self {
            repo_url: config.repo_url.clone(),
            token: config.token.clone(),
            output_path: config.output_path.clone(),
            author_name: config.author_name.clone(),
            author_email: config.author_email.clone(),
        }
    }

    /// Runs one git command and returns its stdout.
    async fn git(&self, dir: Option<&Path>, args: &[&str], token: &str) -> Result<String> {
        let subcommand = args.first().copied().unwrap_or_default();
        debug!("git {}", subcommand);

        let mut cmd = Command::new("git");
        cmd.args(args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .env("GIT_AUTHOR_NAME", &self.author_name)
            .env("GIT_AUTHOR_EMAIL", &self.author_email)
            .env("GIT_COMMITTER_NAME", &self.author_name)
            .env("GIT_COMMITTER_EMAIL", &self.author_email);
        if let Some(dir) = dir {
            cmd.current_dir(dir);
        }

        let output =
            cmd.output().await.with_context(|| format!("Failed to run git {}", subcommand))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!(
                "git {} failed ({}): {}",
                subcommand,
                output.status,
                redact(stderr.trim(), token)
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl Publisher for GitPublisher {
    async fn publish(&self, content: &[u8]) -> Result<PublishOutcome> {
        let token = self.token.as_ref().map(Secret::expose).filter(|t| !t.is_empty());
        let (Some(repo_url), Some(token)) = (self.repo_url.as_deref(), token) else {
            let reason = PriceError::PublishSkipped {
                reason: "REPO_URL or GITHUB_TOKEN is not set".to_string(),
            };
            info!("{}", reason);
            return Ok(PublishOutcome::Skipped(reason));
        };

        check_output_path(&self.output_path)?;

        let workdir = tempfile::tempdir().context("Failed to create clone directory")?;
        let repo = workdir.path().join("repo");
        let repo_arg = repo.to_string_lossy().into_owned();
        let clone_url = authenticated_url(repo_url, token);

        info!("Cloning {}", repo_url);
        self.git(None, &["clone", "--depth", "1", &clone_url, &repo_arg], token).await?;

        let target = repo.join(&self.output_path);
        if is_unchanged(&target, content) {
            info!("{} is unchanged, nothing to commit", self.output_path);
            return Ok(PublishOutcome::Unchanged);
        }

        write_atomic(&target, content)?;

        let message = commit_message(Utc::now());
        self.git(Some(&repo), &["add", "--", &self.output_path], token).await?;
        self.git(Some(&repo), &["commit", "-m", &message], token).await?;
        self.git(Some(&repo), &["push", "origin", "HEAD"], token).await?;

        info!("Pushed {}: {}", self.output_path, message);
        Ok(PublishOutcome::Published { message })
    }
}

/// Injects the token into an https remote as `oauth2:<token>@`.
///
/// Other remotes (ssh, local paths) are used as given.
pub fn authenticated_url(repo_url: &str, token: &str) -> String {
    match repo_url.strip_prefix("https://") {
        Some(rest) => format!("https://oauth2:{}@{}", urlencoding::encode(token), rest),
        None => {
            warn!("Remote is not https, token is not injected");
            repo_url.to_string()
        }
    }
}

/// Replaces every occurrence of the token (raw or URL-encoded) with `***`.
pub fn redact(text: &str, token: &str) -> String {
    if token.is_empty() {
        return text.to_string();
    }
    text.replace(token, "***").replace(&*urlencoding::encode(token), "***")
}

/// Commit message stamped with the UTC time of the update.
pub fn commit_message(now: DateTime<Utc>) -> String {
    format!("Data update: {}", now.format("%Y-%m-%d %H:%M:%S UTC"))
}

/// Rejects dataset paths that would escape the repository.
fn check_output_path(output_path: &str) -> Result<()> {
    let path = Path::new(output_path);
    let escapes =
        path.components().any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if output_path.is_empty() || escapes {
        anyhow::bail!("Output path {:?} must be relative to the repository root", output_path);
    }
    Ok(())
}

/// Returns true if `path` exists with exactly `content`.
fn is_unchanged(path: &Path, content: &[u8]) -> bool {
    std::fs::read(path).map(|existing| existing == content).unwrap_or(false)
}

/// Writes through a sibling temp file so readers never see a partial file.
fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let parent = path.parent().context("Output path has no parent directory")?;
    std::fs::create_dir_all(parent)
        .with_context(|| format!("Failed to create {}", parent.display()))?;

    let mut file = tempfile::NamedTempFile::new_in(parent)
        .with_context(|| format!("Failed to create temp file in {}", parent.display()))?;
    file.write_all(content).context("Failed to write dataset")?;
    file.persist(path).with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}
