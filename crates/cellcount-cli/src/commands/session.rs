use anyhow::Result;
use cellcount_core::counting::{CountKind, CountTarget, CountingMode};
use cellcount_core::session::Confirmation;
use cellcount_core::volume::{VolumeField, VolumePreset};
use colored::Colorize;

use super::{open_session, render};

/// One technician edit.
pub enum Edit {
    SampleId(String),
    Density(String),
    Volume(VolumeField, String),
    Preset(VolumePreset),
    Mode(CountingMode),
    Increment(CountTarget, CountKind, i64),
    Direct(CountTarget, CountKind, String),
    Review(CountTarget),
}

pub async fn status() -> Result<()> {
    let session = open_session().await?;
    if !session.was_restored() {
        println!("{}", "No stored session, showing defaults".dimmed());
    }
    render::session(&session);
    session.close().await;
    Ok(())
}

pub async fn edit(edit: Edit) -> Result<()> {
    let mut session = open_session().await?;

    match edit {
        Edit::SampleId(id) => session.set_sample_id(id),
        Edit::Density(text) => session.set_density_text(&text),
        Edit::Volume(field, text) => session.set_volume_text(field, &text),
        Edit::Preset(preset) => {
            session.apply_preset(preset);
            render::preset_applied(preset);
        }
        Edit::Mode(mode) => session.set_mode(mode),
        Edit::Increment(target, kind, delta) => {
            session.increment(target, kind, delta);
        }
        Edit::Direct(target, kind, text) => {
            if !session.set_direct(target, kind, &text) {
                eprintln!(
                    "{}",
                    format!("'{}' is not a count, nothing changed", text).yellow()
                );
            }
        }
        Edit::Review(target) => session.mark_reviewed(target),
    }

    render::session(&session);
    session.close().await;
    Ok(())
}

pub async fn new_sample(confirmed: bool) -> Result<()> {
    let mut session = open_session().await?;

    if session.new_sample(confirmed) {
        println!("{}", "Started a new sample".green());
        render::session(&session);
    } else {
        println!("{}", Confirmation::NewSample.prompt().yellow());
        println!("Re-run with --yes to confirm.");
    }

    session.close().await;
    Ok(())
}
