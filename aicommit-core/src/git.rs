//! Staged diff collection and commit creation using git2.

use std::fmt;
use std::path::Path;

use git2::{Delta, DiffFormat, DiffOptions, ErrorCode, IndexAddOption, Oid, Repository, Tree};
use tracing::{info, warn};

use crate::error::GitError;

/// Maximum characters of patch text sent to the model.
pub const MAX_DIFF_CHARS: usize = 30_000;

const TRUNCATION_MARKER: &str = "\n... [diff truncated]\n";

/// Status of a staged file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            FileStatus::Added => 'A',
            FileStatus::Modified => 'M',
            FileStatus::Deleted => 'D',
            FileStatus::Renamed => 'R',
        };
        write!(f, "{c}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub path: String,
    pub status: FileStatus,
}

/// The staged changes handed to the generator.
#[derive(Debug, Clone)]
pub struct StagedDiff {
    /// Unified patch text, possibly truncated to [`MAX_DIFF_CHARS`].
    pub text: String,
    pub files: Vec<StagedFile>,
    pub insertions: usize,
    pub deletions: usize,
    pub truncated: bool,
}

/// Result of a successful commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSummary {
    pub oid: Oid,
    pub subject: String,
}

impl CommitSummary {
    pub fn short_id(&self) -> String {
        self.oid.to_string().chars().take(7).collect()
    }
}

/// Open the repository containing `path` (searches parent directories).
pub fn open_repository(path: impl AsRef<Path>) -> Result<Repository, GitError> {
    Repository::discover(path).map_err(GitError::OpenRepository)
}

/// Resolve the HEAD tree, treating an unborn branch as "no tree".
fn resolve_head_tree(repo: &Repository) -> Result<Option<Tree<'_>>, GitError> {
    let head_ref = match repo.head() {
        Ok(r) => r,
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
            return Ok(None);
        }
        Err(e) => return Err(GitError::DiffFailed(e)),
    };
    let tree = head_ref.peel_to_tree().map_err(GitError::DiffFailed)?;
    Ok(Some(tree))
}

/// Stage every change in the working tree, like `git add -A`.
pub fn stage_all(repo: &Repository) -> Result<(), GitError> {
    let mut index = repo.index().map_err(GitError::StagingFailed)?;
    index
        .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
        .map_err(GitError::StagingFailed)?;
    // add_all does not record deletions.
    index
        .update_all(["*"].iter(), None)
        .map_err(GitError::StagingFailed)?;
    index.write().map_err(GitError::StagingFailed)?;
    Ok(())
}

/// Collect the index-vs-HEAD diff (`git diff --cached --diff-algorithm=minimal`).
///
/// Returns [`GitError::NothingStaged`] when the index matches HEAD.
pub fn staged_diff(repo: &Repository) -> Result<StagedDiff, GitError> {
    let head_tree = resolve_head_tree(repo)?;
    let mut opts = DiffOptions::new();
    opts.minimal(true);
    let diff = repo
        .diff_tree_to_index(head_tree.as_ref(), None, Some(&mut opts))
        .map_err(GitError::DiffFailed)?;

    let files: Vec<StagedFile> = diff
        .deltas()
        .map(|delta| {
            let path = delta
                .new_file()
                .path()
                .or_else(|| delta.old_file().path())
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_else(|| "unknown".to_string());
            let status = match delta.status() {
                Delta::Added => FileStatus::Added,
                Delta::Deleted => FileStatus::Deleted,
                Delta::Renamed => FileStatus::Renamed,
                _ => FileStatus::Modified,
            };
            StagedFile { path, status }
        })
        .collect();

    if files.is_empty() {
        return Err(GitError::NothingStaged);
    }

    let stats = diff.stats().map_err(GitError::DiffFailed)?;

    let mut text = String::new();
    diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
        if matches!(line.origin(), '+' | '-' | ' ') {
            text.push(line.origin());
        }
        text.push_str(&String::from_utf8_lossy(line.content()));
        true
    })
    .map_err(GitError::DiffFailed)?;

    let (text, truncated) = truncate_diff(text.trim_end(), MAX_DIFF_CHARS);
    if truncated {
        warn!("Staged diff exceeds {} chars, truncating", MAX_DIFF_CHARS);
    }

    Ok(StagedDiff {
        text,
        files,
        insertions: stats.insertions(),
        deletions: stats.deletions(),
        truncated,
    })
}

/// Truncate on a char boundary, appending a marker when anything was cut.
fn truncate_diff(text: &str, max_chars: usize) -> (String, bool) {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => {
            let mut out = text[..cut].to_string();
            out.push_str(TRUNCATION_MARKER);
            (out, true)
        }
        None => (text.to_string(), false),
    }
}

/// Commit the current index on HEAD with `message`.
///
/// Creates a root commit when HEAD is unborn.
pub fn commit(repo: &Repository, message: &str) -> Result<CommitSummary, GitError> {
    let mut index = repo.index().map_err(GitError::CommitFailed)?;
    let tree_id = index.write_tree().map_err(GitError::CommitFailed)?;
    let tree = repo.find_tree(tree_id).map_err(GitError::CommitFailed)?;

    let sig = repo.signature().map_err(GitError::Signature)?;

    let parent = match repo.head() {
        Ok(head) => Some(head.peel_to_commit().map_err(GitError::CommitFailed)?),
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => None,
        Err(e) => return Err(GitError::CommitFailed(e)),
    };
    let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

    let oid = repo
        .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .map_err(GitError::CommitFailed)?;

    let subject = message.lines().next().unwrap_or_default().to_string();
    info!("Created commit {} ({})", oid, subject);
    Ok(CommitSummary { oid, subject })
}
