//! Command execution against the workspace file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};

use quest_editor::{EditorService, WORKSPACE_SCHEMA, WORKSPACE_SCHEMA_VERSION};
use quest_export::DownloadFormat;
use quest_model::{ExplorationChange, exploration::Exploration};
use quest_rights::{Actor, Role};

use crate::cli::{ApplyArgs, Command, ExportFormatArg, NewArgs};

/// Load the workspace, run one command against it, and save it back when
/// the command mutates state.
pub fn run(command: &Command, workspace_path: &Path, user: &str) -> Result<()> {
    let mut service = load_workspace(workspace_path)?;
    let actor = Actor::new(user, user);

    let mutated = match command {
        Command::New(args) => {
            run_new(&mut service, &actor, args)?;
            true
        }
        Command::Apply(args) => {
            run_apply(&mut service, &actor, args)?;
            true
        }
        Command::History { exploration_id } => {
            print_history(&service, exploration_id)?;
            false
        }
        Command::Revert {
            exploration_id,
            current_version,
            revert_to_version,
        } => {
            let version = service.revert_exploration(
                &actor,
                exploration_id,
                *current_version,
                &serde_json::json!(revert_to_version),
            )?;
            println!("Reverted {exploration_id} to version {revert_to_version}; now at version {version}");
            true
        }
        Command::Export {
            exploration_id,
            format,
            output,
        } => {
            let format = match format {
                ExportFormatArg::Zip => DownloadFormat::Zip,
                ExportFormatArg::Json => DownloadFormat::Json,
                ExportFormatArg::Yaml => DownloadFormat::Yaml,
            };
            let artifact = service.download(exploration_id, format)?;
            let path = output
                .clone()
                .unwrap_or_else(|| artifact.filename.clone().into());
            fs::write(&path, &artifact.body)
                .with_context(|| format!("write export to {}", path.display()))?;
            println!("Exported {exploration_id} to {}", path.display());
            false
        }
        Command::Stats { exploration_id } => {
            service.process_pending_stats();
            let summary = service.statistics(exploration_id)?;
            println!("Starts: {}", summary.num_starts);
            println!("Completions: {}", summary.num_completions);
            true
        }
        Command::Publish { exploration_id } => {
            service.publish_exploration(&actor, exploration_id)?;
            println!("Published {exploration_id}");
            true
        }
        Command::AssignRole {
            exploration_id,
            grantee,
            role,
        } => {
            let role: Role = role.parse().map_err(anyhow::Error::msg)?;
            service.assign_role(&actor, exploration_id, grantee, role)?;
            println!("Granted {role} on {exploration_id} to {grantee}");
            true
        }
        Command::Delete { exploration_id } => {
            service.delete_exploration(&actor, exploration_id)?;
            println!("Deleted {exploration_id}");
            true
        }
        Command::Ban { username } => {
            service.config_mut().ban(username.clone());
            println!("Banned {username}");
            true
        }
        Command::AddAdmin { username } => {
            service.config_mut().add_admin(username.clone());
            println!("Added admin {username}");
            true
        }
    };

    if mutated {
        quest_store::save_envelope(
            WORKSPACE_SCHEMA,
            WORKSPACE_SCHEMA_VERSION,
            &service,
            workspace_path,
        )?;
    }
    Ok(())
}

fn load_workspace(path: &Path) -> Result<EditorService> {
    if path.exists() {
        Ok(quest_store::load_envelope(
            WORKSPACE_SCHEMA,
            WORKSPACE_SCHEMA_VERSION,
            path,
        )?)
    } else {
        Ok(EditorService::default())
    }
}

fn run_new(service: &mut EditorService, actor: &Actor, args: &NewArgs) -> Result<()> {
    let mut exploration =
        Exploration::default_exploration(&args.exploration_id, &args.title, &args.category);
    if let Some(objective) = &args.objective {
        exploration.objective = objective.clone();
    }
    let version = service.create_exploration(actor, exploration)?;
    println!("Created {} at version {version}", args.exploration_id);
    Ok(())
}

fn run_apply(service: &mut EditorService, actor: &Actor, args: &ApplyArgs) -> Result<()> {
    let contents = fs::read_to_string(&args.changes)
        .with_context(|| format!("read change list from {}", args.changes.display()))?;
    let changes: Vec<ExplorationChange> =
        serde_json::from_str(&contents).context("parse change list")?;
    let next = service.apply_change_list(
        actor,
        &args.exploration_id,
        args.version,
        &changes,
        &args.message,
    )?;
    println!(
        "Applied {} change(s) to {}; now at version {}",
        changes.len(),
        args.exploration_id,
        next.version
    );
    Ok(())
}

fn print_history(service: &EditorService, exploration_id: &str) -> Result<()> {
    let history = service.store().history(exploration_id)?;

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Version"),
        Cell::new("Committer"),
        Cell::new("Date"),
        Cell::new("Message"),
    ]);
    if let Some(column) = table.column_mut(0) {
        column.set_cell_alignment(CellAlignment::Right);
    }
    for commit in history {
        table.add_row(vec![
            Cell::new(commit.version),
            Cell::new(&commit.committer_id),
            Cell::new(commit.created_at.format("%Y-%m-%d %H:%M:%S")),
            Cell::new(&commit.commit_message),
        ]);
    }
    println!("{table}");
    Ok(())
}
