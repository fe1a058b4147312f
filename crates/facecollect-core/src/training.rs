//! Remote model training with the controls held for the whole call.

use crate::gate::ControlGate;
use crate::ports::{TrainError, Trainer, Ui};
use crate::types::TrainedModel;

pub const TRAINING_STARTED_MESSAGE: &str = "Training model... This may take a while.";

/// Trigger training. Controls are disabled for the duration of the call and
/// re-enabled on every exit path.
pub async fn run_training(
    trainer: &dyn Trainer,
    gate: &ControlGate,
    ui: &dyn Ui,
) -> Result<TrainedModel, TrainError> {
    let _controls = gate.try_acquire(ui).ok_or(TrainError::Busy)?;
    ui.set_message(TRAINING_STARTED_MESSAGE);
    tracing::info!("training requested");

    let result = trainer.train().await;
    match &result {
        Ok(model) => {
            tracing::info!(model_path = %model.model_path, "training complete");
            ui.set_message(&format!(
                "Training complete! Model saved to: {}. Reload /stream to use it.",
                model.model_path
            ));
        }
        Err(e) => {
            tracing::error!(error = %e, "training failed");
            ui.set_message(&e.to_string());
        }
    }
    result
}
