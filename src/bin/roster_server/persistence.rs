use std::path::Path;

use super::*;

/// Seed input: flat lists, the same shape the authority would export.
#[derive(Debug, serde::Deserialize)]
struct SeedFile {
    #[serde(default)]
    members: Vec<DirectoryMember>,

    #[serde(default)]
    groups: Vec<DirectoryGroup>,
}

pub(super) fn directory_path(data_dir: &Path) -> PathBuf {
    data_dir.join("directory.json")
}

pub(super) fn persist_directory(state: &AppState, directory: &Directory) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(directory).context("serialize directory")?;
    write_atomic_overwrite(&directory_path(&state.data_dir), &bytes)
        .context("write directory.json")?;
    Ok(())
}

/// Loads `directory.json` if present; otherwise builds a directory from the
/// seed file (or an empty one) and writes it out.
pub(super) fn load_or_seed_directory(
    data_dir: &Path,
    seed: Option<&Path>,
    service_member: &str,
) -> Result<Directory> {
    let path = directory_path(data_dir);
    if path.exists() {
        let bytes = std::fs::read(&path).with_context(|| format!("read {}", path.display()))?;
        let mut directory: Directory = serde_json::from_slice(&bytes)
            .with_context(|| format!("parse {}", path.display()))?;
        if directory.version != DIRECTORY_VERSION {
            return Err(anyhow::anyhow!(
                "unsupported directory.json version {}",
                directory.version
            ));
        }
        if directory.service_member != service_member {
            tracing::warn!(
                stored = %directory.service_member,
                requested = %service_member,
                "service member differs from stored directory; using requested"
            );
            directory.service_member = service_member.to_string();
        }
        return Ok(directory);
    }

    let mut directory = Directory::empty(service_member);
    if let Some(seed) = seed {
        let bytes = std::fs::read(seed).with_context(|| format!("read seed {}", seed.display()))?;
        let parsed: SeedFile = serde_json::from_slice(&bytes)
            .with_context(|| format!("parse seed {}", seed.display()))?;
        for m in parsed.members {
            validate_member_id(&m.id).with_context(|| format!("seed member {}", m.id))?;
            directory.members.insert(m.id.clone(), m);
        }
        for g in parsed.groups {
            validate_group_id(&g.id).with_context(|| format!("seed group {}", g.id))?;
            directory.groups.insert(g.id.clone(), g);
        }
    }

    // The service account always exists, as a bot so fetch-all hides it.
    directory
        .members
        .entry(service_member.to_string())
        .or_insert_with(|| DirectoryMember {
            id: service_member.to_string(),
            name: service_member.to_string(),
            is_bot: true,
            deleted: false,
        });

    let bytes = serde_json::to_vec_pretty(&directory).context("serialize directory")?;
    write_atomic_overwrite(&path, &bytes).context("write directory.json")?;
    Ok(directory)
}

pub(super) fn write_atomic_overwrite(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create dir {}", parent.display()))?;
    }
    let tmp = path.with_extension(format!("tmp.{}", std::process::id()));
    std::fs::write(&tmp, bytes).with_context(|| format!("write {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("rename {} -> {}", tmp.display(), path.display()))?;
    Ok(())
}
