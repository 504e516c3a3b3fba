use uuid::Uuid;

use crate::AppState;
use crate::database::models::{Trainer, TrainerInput};
use crate::database::repositories::trainer as trainer_repo;
use crate::error::{AppError, AppResult};
use crate::services::auth::Caller;

pub async fn create_trainer(state: &AppState, caller: &Caller, input: TrainerInput) -> AppResult<Trainer> {
    caller.require_admin()?;
    input.validate().map_err(AppError::ValidationError)?;

    let mut conn = state.pool.acquire().await?;
    let trainer = trainer_repo::create_trainer(&mut conn, &input, state.now()).await?;
    log::info!("Created trainer {} ({})", trainer.id, trainer.name);
    Ok(trainer)
}

pub async fn update_trainer(
    state: &AppState,
    caller: &Caller,
    trainer_id: Uuid,
    input: TrainerInput,
) -> AppResult<Trainer> {
    caller.require_admin()?;
    input.validate().map_err(AppError::ValidationError)?;

    let mut conn = state.pool.acquire().await?;
    trainer_repo::update_trainer(&mut conn, trainer_id, &input, state.now())
        .await?
        .ok_or_else(|| AppError::not_found("trainer", trainer_id))
}

/// Only trainers without booking history can be removed.
pub async fn delete_trainer(state: &AppState, caller: &Caller, trainer_id: Uuid) -> AppResult<()> {
    caller.require_admin()?;
    let mut conn = state.pool.acquire().await?;

    if trainer_repo::delete_unbooked_trainer(&mut conn, trainer_id).await? {
        log::info!("Deleted trainer {}", trainer_id);
        return Ok(());
    }
    match trainer_repo::find_by_id(&mut conn, trainer_id).await? {
        None => Err(AppError::not_found("trainer", trainer_id)),
        Some(_) => Err(AppError::Conflict(format!(
            "trainer {} has bookings and cannot be deleted",
            trainer_id
        ))),
    }
}

pub async fn get_trainer(state: &AppState, trainer_id: Uuid) -> AppResult<Trainer> {
    let mut conn = state.pool.acquire().await?;
    trainer_repo::find_by_id(&mut conn, trainer_id)
        .await?
        .ok_or_else(|| AppError::not_found("trainer", trainer_id))
}

pub async fn list_trainers(state: &AppState) -> AppResult<Vec<Trainer>> {
    let mut conn = state.pool.acquire().await?;
    Ok(trainer_repo::list_trainers(&mut conn).await?)
}
