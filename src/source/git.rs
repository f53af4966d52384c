//! Git sources: clone and checkout at a pinned reference
//!
//! Clones are full (not shallow) because pinned refs are usually tags, and
//! resolving a tag needs the ref advertisement a shallow clone omits.
//! Authentication is delegated to git's native credential machinery (SSH
//! agent, default credentials).

use std::path::Path;

use git2::{Cred, FetchOptions, Oid, RemoteCallbacks, Repository, build::RepoBuilder};

use crate::error::{Result, VendorError};

/// Clone `url` and check out the pinned `git_ref` into `dest`
pub fn checkout(url: &str, git_ref: &str, dest: &Path) -> Result<()> {
    let repo = clone(url, dest)?;
    let oid = resolve_ref(&repo, git_ref)?;
    checkout_commit(&repo, oid, git_ref)?;
    Ok(())
}

/// Clone a git repository to a target directory
fn clone(url: &str, target: &Path) -> Result<Repository> {
    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(|_url, username_from_url, allowed_types| {
        if allowed_types.is_ssh_key() {
            let username = username_from_url.unwrap_or("git");
            if let Ok(cred) = Cred::ssh_key_from_agent(username) {
                return Ok(cred);
            }
        }
        Cred::default()
    });

    let mut fetch_options = FetchOptions::new();
    fetch_options.remote_callbacks(callbacks);

    let mut builder = RepoBuilder::new();
    builder.fetch_options(fetch_options);

    builder
        .clone(url, target)
        .map_err(|e| VendorError::GitCloneFailed {
            url: url.to_string(),
            reason: e.message().to_string(),
        })
}

/// Resolve a pinned ref (tag, branch, or full SHA) to a commit id
fn resolve_ref(repo: &Repository, git_ref: &str) -> Result<Oid> {
    // Full SHAs resolve without a ref lookup
    if git_ref.len() == 40 {
        if let Ok(oid) = Oid::from_str(git_ref) {
            if repo.find_commit(oid).is_ok() {
                return Ok(oid);
            }
        }
    }

    let candidates = [
        format!("refs/tags/{git_ref}"),
        format!("refs/remotes/origin/{git_ref}"),
        format!("refs/heads/{git_ref}"),
    ];

    for candidate in &candidates {
        if let Ok(oid) = repo.refname_to_id(candidate) {
            // Peel annotated tags to the commit they point at
            if let Ok(object) = repo.find_object(oid, None) {
                if let Ok(peeled) = object.peel(git2::ObjectType::Commit) {
                    return Ok(peeled.id());
                }
            }
            return Ok(oid);
        }
    }

    Err(VendorError::GitRefResolveFailed {
        git_ref: git_ref.to_string(),
        reason: "no matching tag, branch, or commit".to_string(),
    })
}

/// Detach HEAD at the resolved commit and force-checkout the working tree
fn checkout_commit(repo: &Repository, oid: Oid, git_ref: &str) -> Result<()> {
    let commit = repo
        .find_commit(oid)
        .map_err(|e| VendorError::GitCheckoutFailed {
            git_ref: git_ref.to_string(),
            reason: e.message().to_string(),
        })?;

    repo.set_head_detached(commit.id())
        .map_err(|e| VendorError::GitCheckoutFailed {
            git_ref: git_ref.to_string(),
            reason: e.message().to_string(),
        })?;

    let mut checkout_builder = git2::build::CheckoutBuilder::new();
    checkout_builder.force();

    repo.checkout_head(Some(&mut checkout_builder))
        .map_err(|e| VendorError::GitCheckoutFailed {
            git_ref: git_ref.to_string(),
            reason: e.message().to_string(),
        })?;

    Ok(())
}
