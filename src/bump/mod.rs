//! Bump orchestrator: classify a change set, mutate the right manifests,
//! optionally commit.
//!
//! Runs as a sequential state machine:
//! `Idle -> Classifying -> {NoOp | PendingBump} -> Mutating -> {Committing} -> Done`,
//! with `Failed` reachable from anywhere. Single-operator, single-process:
//! two concurrent runs against one workspace would race on the manifest
//! reads, and no locking is provided.

use std::fmt;
use std::path::{Path, PathBuf};

use dialoguer::Confirm;
use git2::Repository;
use semver::Version;
use tracing::{debug, warn};

use crate::classify::{aggregate_diff, ChangeType, ClassifyRules, WorkspaceFacts};
use crate::diff::{parse_diff, strip_version_noise, truncate_to_budget};
use crate::error::{BumpError, GitError, ManifestError};
use crate::git::{
    range_diff, stage_and_commit, working_tree_diff, working_tree_diff_for_paths,
    working_tree_status,
};
use crate::llm::{classify_bump, summarize, TextModel};
use crate::manifest::{apply_bump, chart, package, BumpKind};

/// Default prompt budget for the classification diff.
pub const DEFAULT_TOKEN_BUDGET: usize = 6_000;

/// Orchestrator state, used for transition logging and failure context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BumpState {
    Idle,
    Classifying,
    NoOp,
    PendingBump,
    Mutating,
    Committing,
    Done,
    Failed,
}

impl fmt::Display for BumpState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BumpState::Idle => "idle",
            BumpState::Classifying => "classifying",
            BumpState::NoOp => "no-op",
            BumpState::PendingBump => "pending-bump",
            BumpState::Mutating => "mutating",
            BumpState::Committing => "committing",
            BumpState::Done => "done",
            BumpState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Configuration for one orchestrator run, derived from CLI flags.
pub struct BumpConfig {
    /// Skip the external classifier and use this bump kind directly.
    pub override_bump: Option<BumpKind>,
    /// Classify `HEAD~n..HEAD` instead of the working tree.
    pub range: Option<usize>,
    pub commit: bool,
    pub commit_message: Option<String>,
    pub dry_run: bool,
    /// Skip the interactive confirmation.
    pub assume_yes: bool,
    pub token_budget: usize,
}

impl BumpConfig {
    /// Whether this run can reach the text model at all: classification
    /// happens unless the bump kind is overridden, and committing without a
    /// caller-supplied message needs a generated summary.
    pub fn wants_model(&self) -> bool {
        self.override_bump.is_none() || (self.commit && self.commit_message.is_none())
    }
}

impl Default for BumpConfig {
    fn default() -> Self {
        BumpConfig {
            override_bump: None,
            range: None,
            commit: false,
            commit_message: None,
            dry_run: false,
            assume_yes: false,
            token_budget: DEFAULT_TOKEN_BUDGET,
        }
    }
}

/// The two versioned documents a workspace may carry.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub root: PathBuf,
    pub app_manifest: Option<PathBuf>,
    pub chart_manifest: Option<PathBuf>,
    /// Repo-relative chart manifest path, for staging and classification.
    pub chart_manifest_rel: String,
}

impl Workspace {
    /// Locate the manifests. At least one must exist.
    pub fn discover(root: &Path, rules: &ClassifyRules) -> Result<Workspace, BumpError> {
        let app = root.join("package.json");
        let chart = root.join(&rules.chart_manifest);

        let workspace = Workspace {
            root: root.to_path_buf(),
            app_manifest: app.exists().then_some(app),
            chart_manifest: chart.exists().then_some(chart),
            chart_manifest_rel: rules.chart_manifest.clone(),
        };

        if workspace.app_manifest.is_none() && workspace.chart_manifest.is_none() {
            return Err(BumpError::NoManifests {
                root: root.to_path_buf(),
            });
        }
        Ok(workspace)
    }

    pub fn facts(&self) -> WorkspaceFacts {
        WorkspaceFacts {
            has_app_manifest: self.app_manifest.is_some(),
            has_chart_manifest: self.chart_manifest.is_some(),
        }
    }
}

/// Which documents a change type mutates, given what exists on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MutationPlan {
    bump_app: bool,
    bump_chart: bool,
    /// Mirror the freshly bumped app version into the chart's `appVersion`.
    sync_mirror: bool,
}

/// HelmOnly touches the chart; AppOnly touches the app manifest and mirrors
/// into the chart; Both touches both. App-side changes in a workspace with
/// no app manifest degrade to a chart bump. The reverse does not hold: a
/// HelmOnly change in a chart-less workspace has no sensible target and the
/// plan stays empty rather than bumping the application version for an
/// infra-only change.
fn plan_mutation(change_type: ChangeType, workspace: &Workspace) -> MutationPlan {
    let has_app = workspace.app_manifest.is_some();
    let has_chart = workspace.chart_manifest.is_some();

    match change_type {
        ChangeType::None => MutationPlan {
            bump_app: false,
            bump_chart: false,
            sync_mirror: false,
        },
        ChangeType::HelmOnly => MutationPlan {
            bump_app: false,
            bump_chart: has_chart,
            sync_mirror: false,
        },
        ChangeType::AppOnly => MutationPlan {
            bump_app: has_app,
            bump_chart: !has_app,
            sync_mirror: has_app && has_chart,
        },
        ChangeType::Both => MutationPlan {
            bump_app: has_app,
            bump_chart: has_chart,
            sync_mirror: has_app && has_chart,
        },
    }
}

/// What a run did (or, for a dry run, would have done).
#[derive(Debug, Clone, Default)]
pub struct BumpOutcome {
    pub change_type: Option<ChangeType>,
    pub bump: Option<BumpKind>,
    pub reasoning: Option<String>,
    pub app_versions: Option<(Version, Version)>,
    pub chart_versions: Option<(Version, Version)>,
    /// New chart `appVersion` mirror value, when synced.
    pub chart_app_version: Option<Version>,
    pub committed: bool,
    /// Commit failure after a successful mutation: the bump stands, the
    /// failure is reported as degradation.
    pub commit_failure: Option<String>,
    pub dry_run: bool,
}

impl BumpOutcome {
    pub fn is_noop(&self) -> bool {
        matches!(self.change_type, Some(ChangeType::None) | None)
    }
}

fn transition(state: &mut BumpState, to: BumpState) {
    debug!("bump state: {state} -> {to}");
    *state = to;
}

/// Run the full bump pipeline against `root`.
pub async fn run_bump(
    root: &Path,
    rules: &ClassifyRules,
    model: &dyn TextModel,
    config: &BumpConfig,
) -> Result<BumpOutcome, BumpError> {
    let mut state = BumpState::Idle;
    let result = run_bump_inner(root, rules, model, config, &mut state).await;
    if let Err(ref e) = result {
        transition(&mut state, BumpState::Failed);
        warn!("bump failed: {e}");
    }
    result
}

async fn run_bump_inner(
    root: &Path,
    rules: &ClassifyRules,
    model: &dyn TextModel,
    config: &BumpConfig,
    state: &mut BumpState,
) -> Result<BumpOutcome, BumpError> {
    // ── Idle: preconditions and change-set collection ──
    let repo = Repository::open(root).map_err(GitError::OpenRepository)?;
    let workspace = Workspace::discover(root, rules)?;

    let raw_diff = match config.range {
        Some(n) => range_diff(&repo, n)?,
        None => {
            let entries = working_tree_status(&repo)?;
            if entries.is_empty() {
                transition(state, BumpState::NoOp);
                println!("  [SKIP] Working tree is clean; nothing to bump");
                return Ok(BumpOutcome {
                    change_type: Some(ChangeType::None),
                    dry_run: config.dry_run,
                    ..BumpOutcome::default()
                });
            }
            debug!("{} changed working-tree entr(ies)", entries.len());
            working_tree_diff(&repo)?
        }
    };

    // ── Classifying ──
    transition(state, BumpState::Classifying);

    let filtered = strip_version_noise(&raw_diff);
    let doc = parse_diff(&filtered);
    let change_type = aggregate_diff(&doc, rules, &workspace.facts());

    let mut outcome = BumpOutcome {
        change_type: Some(change_type),
        dry_run: config.dry_run,
        ..BumpOutcome::default()
    };

    if change_type == ChangeType::None {
        transition(state, BumpState::NoOp);
        println!("  [SKIP] No semantic changes found; nothing to bump");
        return Ok(outcome);
    }

    let (bump, reasoning) = match config.override_bump {
        // Override short-circuits: no API call at all.
        Some(kind) => (kind, None),
        None => {
            let prompt_diff = truncate_to_budget(&filtered, config.token_budget);
            classify_bump(model, &prompt_diff, change_type).await?
        }
    };

    transition(state, BumpState::PendingBump);
    outcome.bump = Some(bump);
    outcome.reasoning = reasoning;

    let plan = plan_mutation(change_type, &workspace);
    println!("  Change type: {change_type}, bump: {bump}");

    if !plan.bump_app && !plan.bump_chart {
        transition(state, BumpState::NoOp);
        println!("  [SKIP] No manifest to apply a {change_type} bump to");
        return Ok(outcome);
    }

    if config.dry_run {
        preview_mutation(&workspace, &plan, bump, &mut outcome)?;
        println!("  Dry run complete. No changes made.");
        return Ok(outcome);
    }

    if !config.assume_yes {
        let confirmed = Confirm::new()
            .with_prompt(format!("Apply {bump} bump ({change_type})?"))
            .default(true)
            .interact()
            .map_err(|_| BumpError::Cancelled)?;
        if !confirmed {
            return Err(BumpError::Cancelled);
        }
    }

    // ── Mutating ──
    transition(state, BumpState::Mutating);
    apply_mutation(&workspace, &plan, bump, &mut outcome)?;

    // ── Committing (optional) ──
    if config.commit {
        transition(state, BumpState::Committing);
        match commit_bump(&repo, &workspace, model, config, &outcome).await {
            Ok(()) => outcome.committed = true,
            Err(e) => {
                // The mutation already succeeded; a failed commit is
                // degradation, not failure.
                warn!("commit failed after successful bump: {e}");
                println!("  [WARN] Version bumped but commit failed: {e}");
                outcome.commit_failure = Some(e.to_string());
            }
        }
    }

    transition(state, BumpState::Done);
    Ok(outcome)
}

/// Read current versions and record the would-be transitions, without writing.
fn preview_mutation(
    workspace: &Workspace,
    plan: &MutationPlan,
    bump: BumpKind,
    outcome: &mut BumpOutcome,
) -> Result<(), BumpError> {
    if plan.bump_app
        && let Some(path) = workspace.app_manifest.as_deref()
    {
        let current = package::read_version(path)?;
        let next = apply_bump(&current, bump);
        println!("  [PLAN] package.json: {current} -> {next}");
        if plan.sync_mirror {
            outcome.chart_app_version = Some(next.clone());
        }
        outcome.app_versions = Some((current, next));
    }
    if plan.bump_chart
        && let Some(path) = workspace.chart_manifest.as_deref()
    {
        let current = chart::read_version(path)?;
        let next = apply_bump(&current, bump);
        println!("  [PLAN] {}: {current} -> {next}", workspace.chart_manifest_rel);
        outcome.chart_versions = Some((current, next));
    }
    Ok(())
}

/// Apply the planned writes, reporting exactly which succeeded on failure.
///
/// Each manifest is read fresh immediately before its write (external tools
/// may have touched it) and replaced in a single atomic whole-document
/// write. The chart `appVersion` mirror is only ever synced from the app
/// version this run just wrote, never from a stale read.
fn apply_mutation(
    workspace: &Workspace,
    plan: &MutationPlan,
    bump: BumpKind,
    outcome: &mut BumpOutcome,
) -> Result<(), BumpError> {
    let mut written: Vec<String> = Vec::new();
    let fail = |written: &[String], path: &Path, e: ManifestError| {
        if written.is_empty() {
            BumpError::Manifest(e)
        } else {
            BumpError::MutationIncomplete {
                written: written.to_vec(),
                path: path.to_path_buf(),
                source: e,
            }
        }
    };

    let mut freshly_bumped_app: Option<Version> = None;

    if plan.bump_app
        && let Some(path) = workspace.app_manifest.as_deref()
    {
        let current = package::read_version(path).map_err(|e| fail(&written, path, e))?;
        let next = apply_bump(&current, bump);
        package::write_version(path, &next).map_err(|e| fail(&written, path, e))?;
        package::refresh_lockfile(&workspace.root, &next);
        written.push("package.json".to_string());
        println!("  [DONE] package.json: {current} -> {next}");
        freshly_bumped_app = Some(next.clone());
        outcome.app_versions = Some((current, next));
    }

    if (plan.bump_chart || (plan.sync_mirror && freshly_bumped_app.is_some()))
        && let Some(path) = workspace.chart_manifest.as_deref()
    {
        let mirror = if plan.sync_mirror {
            freshly_bumped_app.as_ref()
        } else {
            None
        };

        let chart_next = if plan.bump_chart {
            let current = chart::read_version(path).map_err(|e| fail(&written, path, e))?;
            let next = apply_bump(&current, bump);
            println!(
                "  [DONE] {}: {current} -> {next}",
                workspace.chart_manifest_rel
            );
            outcome.chart_versions = Some((current, next.clone()));
            Some(next)
        } else {
            None
        };

        chart::write_versions(path, chart_next.as_ref(), mirror)
            .map_err(|e| fail(&written, path, e))?;
        if let Some(m) = mirror {
            println!(
                "  [DONE] {}: appVersion -> {m}",
                workspace.chart_manifest_rel
            );
            outcome.chart_app_version = Some(m.clone());
        }
        written.push(workspace.chart_manifest_rel.clone());
    }

    Ok(())
}

/// Stage the rewritten manifests and commit.
///
/// The message is either caller-supplied or generated by the model over the
/// net diff of the staged files (truncated separately from the
/// classification prompt).
async fn commit_bump(
    repo: &Repository,
    workspace: &Workspace,
    model: &dyn TextModel,
    config: &BumpConfig,
    outcome: &BumpOutcome,
) -> Result<(), BumpError> {
    let mut paths: Vec<String> = Vec::new();
    if outcome.app_versions.is_some() {
        paths.push("package.json".to_string());
        if workspace.root.join("package-lock.json").exists() {
            paths.push("package-lock.json".to_string());
        }
    }
    if outcome.chart_versions.is_some() || outcome.chart_app_version.is_some() {
        paths.push(workspace.chart_manifest_rel.clone());
    }

    let message = match &config.commit_message {
        Some(m) => m.clone(),
        None => {
            let net_diff = working_tree_diff_for_paths(repo, &paths)?;
            let prompt_diff = truncate_to_budget(&net_diff, config.token_budget);
            summarize(model, &prompt_diff).await?
        }
    };

    let oid = stage_and_commit(repo, &paths, &message)?;
    let short = &oid.to_string()[..7];
    println!("  [DONE] Created commit {short}: {message}");
    Ok(())
}
