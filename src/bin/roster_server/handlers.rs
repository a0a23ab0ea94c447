use std::collections::BTreeSet;

use axum::extract::rejection::JsonRejection;

use super::*;

pub(super) async fn get_data(State(state): State<Arc<AppState>>) -> Json<DirectoryData> {
    let directory = state.directory.read().await;
    Json(directory.data())
}

pub(super) async fn update_memberships(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<UpdateMembershipsRequest>, JsonRejection>,
) -> Result<Json<MutationResponse>, Response> {
    let Json(payload) = payload.map_err(rejected_body)?;
    validate_group_id(&payload.group_id).map_err(bad_request)?;
    let target: BTreeSet<String> = payload.target_member_ids.into_iter().collect();

    let mut directory = state.directory.write().await;
    let (invited, removed) = directory
        .set_members(&payload.group_id, &target)
        .map_err(refused)?;
    if invited + removed > 0 {
        persist_directory(&state, &directory).map_err(internal_error)?;
    }
    tracing::info!(group_id = %payload.group_id, invited, removed, "memberships updated");

    Ok(ok_message(format!(
        "{} invited, {} removed",
        invited, removed
    )))
}

pub(super) async fn create_group(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateGroupRequest>, JsonRejection>,
) -> Result<Json<MutationResponse>, Response> {
    let Json(payload) = payload.map_err(rejected_body)?;
    let id = new_group_id().map_err(internal_error)?;

    let mut directory = state.directory.write().await;
    let group = directory
        .create_group(&payload.name, payload.is_private, id, now_ts())
        .map_err(refused)?;
    persist_directory(&state, &directory).map_err(internal_error)?;
    tracing::info!(group_id = %group.id, name = %group.name, is_private = group.is_private, "group created");

    Ok(Json(MutationResponse {
        ok: true,
        message: Some(format!("created #{}", group.name)),
        group: Some(roster::model::GroupSummary {
            id: group.id,
            name: group.name,
            is_private: group.is_private,
        }),
        ..MutationResponse::default()
    }))
}

pub(super) async fn archive_group(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ArchiveGroupRequest>, JsonRejection>,
) -> Result<Json<MutationResponse>, Response> {
    let Json(payload) = payload.map_err(rejected_body)?;
    validate_group_id(&payload.group_id).map_err(bad_request)?;

    let mut directory = state.directory.write().await;
    directory
        .archive_group(&payload.group_id, now_ts())
        .map_err(refused)?;
    persist_directory(&state, &directory).map_err(internal_error)?;
    tracing::info!(group_id = %payload.group_id, "group archived");

    Ok(ok_message(format!("archived {}", payload.group_id)))
}

pub(super) async fn register_member(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterMemberRequest>, JsonRejection>,
) -> Result<Json<MutationResponse>, Response> {
    let Json(payload) = payload.map_err(rejected_body)?;
    let mut directory = state.directory.write().await;
    directory
        .register_member(&payload.id, &payload.name, payload.is_bot)
        .map_err(refused)?;
    persist_directory(&state, &directory).map_err(internal_error)?;
    tracing::info!(member_id = %payload.id, is_bot = payload.is_bot, "member registered");

    Ok(ok_message(format!("registered {}", payload.id)))
}

fn new_group_id() -> Result<String> {
    let mut bytes = [0u8; 5];
    getrandom::getrandom(&mut bytes).map_err(|e| anyhow::anyhow!("generate group id: {}", e))?;
    let hex: String = bytes.iter().map(|b| format!("{:02X}", b)).collect();
    Ok(format!("G{}", hex))
}
