use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde_json::json;
use wildlog_core::{Coordinate, ObservationDraft, ObservationEdit};
use wildlog_service::ObservationController;

pub(crate) struct AddForm {
    pub name: String,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub image_uri: Option<String>,
}

impl AddForm {
    fn into_draft(self, coordinate: Coordinate) -> ObservationDraft {
        ObservationDraft::new(self.name, coordinate)
            .maybe_date(self.date)
            .maybe_description(self.description)
            .maybe_image_uri(self.image_uri)
    }
}

pub(crate) async fn run_list(controller: &ObservationController) -> Result<()> {
    let observations = controller.observations().await;
    println!("{}", serde_json::to_string_pretty(&observations)?);
    Ok(())
}

pub(crate) async fn run_show(controller: &ObservationController, id: &str) -> Result<()> {
    let observation =
        controller.get(id).await.with_context(|| format!("Observation not found: {id}"))?;
    println!("{}", serde_json::to_string_pretty(&observation)?);
    Ok(())
}

pub(crate) async fn run_add(
    controller: &ObservationController,
    position: Option<(f64, f64)>,
    form: AddForm,
) -> Result<()> {
    let observation = match position {
        Some((lat, lon)) => {
            let coordinate = Coordinate::new(lat, lon)?;
            controller.add_observation(form.into_draft(coordinate)).await?
        },
        None => controller
            .add_at_current_location(|coordinate| form.into_draft(coordinate))
            .await
            .context("pass --lat/--lon or set WILDLOG_FIXED_POSITION")?,
    };
    println!("{}", serde_json::to_string_pretty(&observation)?);
    Ok(())
}

pub(crate) async fn run_edit(
    controller: &ObservationController,
    id: &str,
    name: Option<String>,
    description: Option<String>,
    clear_description: bool,
) -> Result<()> {
    let mut edit = ObservationEdit { name, ..ObservationEdit::default() };
    if clear_description {
        edit = edit.clear_description();
    } else if let Some(description) = description {
        edit = edit.description(description);
    }
    let observation = controller.edit_observation(id, &edit).await?;
    println!("{}", serde_json::to_string_pretty(&observation)?);
    Ok(())
}

pub(crate) async fn run_delete(controller: &ObservationController, id: &str) -> Result<()> {
    let removed = controller.delete_observation(id).await?;
    println!("{}", serde_json::to_string_pretty(&json!({ "id": id, "removed": removed }))?);
    Ok(())
}

pub(crate) async fn run_share(controller: &ObservationController, id: &str) -> Result<()> {
    println!("{}", controller.share_message(id).await?);
    Ok(())
}

pub(crate) async fn run_locate(controller: &ObservationController) -> Result<()> {
    controller.initialize().await;
    let snapshot = controller.location().snapshot();
    let report = json!({
        "screen": controller.screen_state(),
        "permission": snapshot.permission,
        "location": snapshot.sample,
        "observations": controller.observations().await.len(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
