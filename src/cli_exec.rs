use std::collections::BTreeSet;
use std::io::{BufRead, Write};

use anyhow::{Context, Result};

use roster::engine::{
    ActionReport, CheckSet, Confirmation, CreateGroupForm, Session, StatusKind, StatusMessage,
};
use roster::model::{RemoteConfig, Snapshot};
use roster::remote::{MembershipRemote, RemoteClient};
use roster::store::ConfigStore;

use crate::cli_runtime::connect;
use crate::{CheckEdit, Commands, GroupCommands, MemberCommands, RemoteCommands};

pub(crate) async fn handle_command(store: &ConfigStore, command: Commands) -> Result<()> {
    match command {
        Commands::Remote { command } => handle_remote_command(store, command),
        Commands::Snapshot { json } => handle_snapshot_command(store, json).await,
        Commands::Group { command } => handle_group_command(store, command).await,
        Commands::Member { command } => handle_member_command(store, command).await,
        Commands::Tui => anyhow::bail!("`tui` is started before the async runtime"),
    }
}

fn handle_remote_command(store: &ConfigStore, command: RemoteCommands) -> Result<()> {
    match command {
        RemoteCommands::Show { json } => {
            let cfg = store.read_config()?;
            // Never echo the token back.
            let remote = cfg.remote.map(|r| RemoteConfig { token: None, ..r });
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&remote).context("serialize remote json")?
                );
            } else if let Some(remote) = remote {
                println!("url: {}", remote.base_url);
                if let Some(secs) = remote.timeout_secs {
                    println!("timeout: {}s", secs);
                }
            } else {
                println!("No remote configured");
            }
        }
        RemoteCommands::Set {
            url,
            token,
            timeout_secs,
        } => {
            store.set_remote(RemoteConfig {
                base_url: url,
                token,
                timeout_secs,
            })?;
            println!("Remote configured");
        }
    }
    Ok(())
}

async fn handle_snapshot_command(store: &ConfigStore, json: bool) -> Result<()> {
    let session = connect(store).await?;
    let snap = session.snapshot();
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&*snap).context("serialize snapshot json")?
        );
        return Ok(());
    }

    println!("members: {}", snap.members.len());
    for m in &snap.members {
        println!("  {} {}", m.id, m.name);
    }
    println!("groups: {}", snap.groups.len());
    for g in &snap.groups {
        println!("  {} {} ({} members)", g.id, g.label(), g.members.len());
    }
    Ok(())
}

async fn handle_group_command(store: &ConfigStore, command: GroupCommands) -> Result<()> {
    match command {
        GroupCommands::List { json } => {
            let session = connect(store).await?;
            let snap = session.snapshot();
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&snap.groups).context("serialize groups json")?
                );
            } else {
                for g in &snap.groups {
                    println!("{} {} ({} members)", g.id, g.label(), g.members.len());
                }
            }
        }
        GroupCommands::Show { group, json } => {
            let session = connect(store).await?;
            let snap = session.snapshot();
            let g = resolve_group(&snap, &group)?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(g).context("serialize group json")?
                );
            } else {
                println!("id: {}", g.id);
                println!("name: #{}", g.name);
                println!("private: {}", g.is_private);
                println!("members:");
                let checks = CheckSet::new(snap.member_ids(), g.members.clone());
                print_checks(&checks, |id| snap.member_name(id).to_string());
            }
        }
        GroupCommands::Sync { group, edit, json } => {
            let mut session = connect(store).await?;
            let snap = session.snapshot();
            let g = resolve_group(&snap, &group)?;
            session.select_group(&g.id);

            let mut checks = CheckSet::new(snap.member_ids(), g.members.clone());
            apply_edit(&mut checks, &edit, |key| {
                resolve_member_id(&snap, key)
            })?;

            if edit.dry_run {
                let plan = roster::engine::diff_for_group(g, checks.checked());
                if json {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&plan).context("serialize plan json")?
                    );
                } else {
                    println!("would set #{} members to:", g.name);
                    for id in &plan.target_members {
                        println!("  {}", snap.member_name(id));
                    }
                }
                return Ok(());
            }

            let report = session.sync_group(checks.into_checked()).await?;
            finish(&session, &report, json)?;
        }
        GroupCommands::Create {
            name,
            private,
            json,
        } => {
            let mut session = connect(store).await?;
            let report = session
                .create_group(CreateGroupForm {
                    name,
                    is_private: private,
                })
                .await?;
            finish(&session, &report, json)?;
        }
        GroupCommands::Archive { group, yes, json } => {
            let mut session = connect(store).await?;
            let snap = session.snapshot();
            let g = resolve_group(&snap, &group)?;
            session.select_group(&g.id);

            let confirmation = if yes || confirm(&format!("Archive {}?", g.label()))? {
                Confirmation::Granted
            } else {
                Confirmation::Declined
            };
            if confirmation == Confirmation::Declined {
                println!("Not archived");
                return Ok(());
            }
            let report = session.archive_focused_group(confirmation).await?;
            finish(&session, &report, json)?;
        }
    }
    Ok(())
}

async fn handle_member_command(store: &ConfigStore, command: MemberCommands) -> Result<()> {
    match command {
        MemberCommands::List { json } => {
            let session = connect(store).await?;
            let snap = session.snapshot();
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&snap.members)
                        .context("serialize members json")?
                );
            } else {
                for m in &snap.members {
                    println!("{} {}", m.id, m.name);
                }
            }
        }
        MemberCommands::Show { member, json } => {
            let session = connect(store).await?;
            let snap = session.snapshot();
            let id = resolve_member_id(&snap, &member)?;
            let groups = snap.groups_of(&id);
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "id": id,
                        "name": snap.member_name(&id),
                        "groups": groups,
                    }))
                    .context("serialize member json")?
                );
            } else {
                println!("id: {}", id);
                println!("name: {}", snap.member_name(&id));
                println!("groups:");
                let checks = CheckSet::new(snap.group_ids(), groups);
                print_checks(&checks, |gid| group_label(&snap, gid));
            }
        }
        MemberCommands::Sync { member, edit, json } => {
            let mut session = connect(store).await?;
            let snap = session.snapshot();
            let id = resolve_member_id(&snap, &member)?;
            session.select_member(&id);

            let mut checks = CheckSet::new(snap.group_ids(), snap.groups_of(&id));
            apply_edit(&mut checks, &edit, |key| {
                resolve_group(&snap, key).map(|g| g.id.clone())
            })?;

            if edit.dry_run {
                let updates = roster::engine::diff_for_member(&id, checks.checked(), &snap.groups);
                if json {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&updates).context("serialize plan json")?
                    );
                } else if updates.is_empty() {
                    println!("{}: no membership changes", snap.member_name(&id));
                } else {
                    for u in &updates {
                        let verb = match u.change {
                            roster::engine::MembershipChange::Add => "join",
                            roster::engine::MembershipChange::Remove => "leave",
                        };
                        println!("would {} {}", verb, group_label(&snap, &u.group_id));
                    }
                }
                return Ok(());
            }

            let report = session.sync_member(checks.into_checked()).await?;
            finish(&session, &report, json)?;
        }
        MemberCommands::Register { id, name } => {
            let (remote, token) = store.require_remote()?;
            let client = RemoteClient::new(remote, token)?;
            client
                .register_member(&id, &name)
                .await
                .with_context(|| format!("register member {}", id))?;
            println!("Registered {} ({})", name, id);
        }
    }
    Ok(())
}

fn resolve_group<'a>(snap: &'a Snapshot, key: &str) -> Result<&'a roster::model::Group> {
    snap.find_group(key)
        .with_context(|| format!("unknown group {}", key))
}

fn resolve_member_id(snap: &Snapshot, key: &str) -> Result<String> {
    snap.find_member(key)
        .map(|m| m.id.clone())
        .with_context(|| format!("unknown member {}", key))
}

fn group_label(snap: &Snapshot, id: &str) -> String {
    snap.group(id)
        .map(|g| g.label())
        .unwrap_or_else(|| id.to_string())
}

/// Applies checkbox gestures in a fixed order: set/all/none, add, remove.
pub(crate) fn apply_edit<F>(checks: &mut CheckSet, edit: &CheckEdit, resolve: F) -> Result<()>
where
    F: Fn(&str) -> Result<String>,
{
    if let Some(set) = &edit.set {
        let ids = set
            .iter()
            .map(|key| resolve(key))
            .collect::<Result<BTreeSet<String>>>()?;
        checks.set_all(false);
        for id in &ids {
            checks.set(id, true);
        }
    } else if edit.all {
        checks.set_all(true);
    } else if edit.none {
        checks.set_all(false);
    }

    for key in &edit.add {
        checks.set(&resolve(key)?, true);
    }
    for key in &edit.remove {
        checks.set(&resolve(key)?, false);
    }
    Ok(())
}

fn print_checks<F>(checks: &CheckSet, label: F)
where
    F: Fn(&str) -> String,
{
    let mark = if checks.all_checked() { "x" } else { " " };
    println!("  [{}] (all)", mark);
    for id in checks.universe() {
        let mark = if checks.is_checked(id) { "x" } else { " " };
        println!("  [{}] {}", mark, label(id));
    }
    for id in checks.checked().difference(checks.universe()) {
        println!("  [x] {} (not in directory)", id);
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    std::io::stdout().flush().context("flush stdout")?;
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("read confirmation")?;
    Ok(matches!(line.trim(), "y" | "Y" | "yes"))
}

/// Prints the outcome; anything short of full success exits non-zero.
fn finish<R>(session: &Session<R>, report: &ActionReport, json: bool) -> Result<()>
where
    R: MembershipRemote + ?Sized,
{
    let status = report.status();
    if json {
        let failures = match report {
            ActionReport::MemberSynced { outcome, .. } => outcome.failures.clone(),
            _ => Vec::new(),
        };
        let created = match report {
            ActionReport::GroupCreated { result: Ok(g), .. } => Some(g.clone()),
            _ => None,
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "action": report.action(),
                "status": status,
                "failures": failures,
                "group": created,
            }))
            .context("serialize report json")?
        );
    } else {
        print_status(&status);
        if let ActionReport::MemberSynced { outcome, .. } = report {
            for f in &outcome.failures {
                eprintln!("  {}: {}", group_label(&session.snapshot(), &f.group_id), f.error);
            }
        }
    }

    // A refresh failure after the action shows up as the session status.
    if let Some(latest) = session.status() {
        if latest != &status {
            eprintln!("warning: {}", latest.text);
        }
    }

    match status.kind {
        StatusKind::Success => Ok(()),
        StatusKind::Warning | StatusKind::Error => Err(anyhow::anyhow!(status.text)),
    }
}

fn print_status(status: &StatusMessage) {
    match status.kind {
        StatusKind::Success => println!("{}", status.text),
        StatusKind::Warning => println!("warning: {}", status.text),
        StatusKind::Error => println!("error: {}", status.text),
    }
}
