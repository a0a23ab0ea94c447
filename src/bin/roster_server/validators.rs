use super::*;

pub(super) fn validate_group_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(anyhow::anyhow!("group name cannot be empty"));
    }
    if name.chars().count() > 80 {
        return Err(anyhow::anyhow!("group name must be at most 80 characters"));
    }
    if !name
        .chars()
        .all(|c| c.is_lowercase() || c.is_numeric() || c == '-' || c == '_')
    {
        return Err(anyhow::anyhow!(
            "invalid_name_specials: group name must be lowercase letters, digits, '-' or '_'"
        ));
    }
    Ok(())
}

pub(super) fn validate_member_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(anyhow::anyhow!("member id cannot be empty"));
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        return Err(anyhow::anyhow!(
            "member id must be ascii alnum or '-', '_', '.'"
        ));
    }
    Ok(())
}

pub(super) fn validate_group_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(anyhow::anyhow!("group id cannot be empty"));
    }
    if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(anyhow::anyhow!("group id must be ascii alnum or '-', '_'"));
    }
    Ok(())
}
