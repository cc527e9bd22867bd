use anyhow::Result;
use cellcount_core::session::Confirmation;
use colored::Colorize;

use super::{open_session, render};

pub async fn save() -> Result<()> {
    let mut session = open_session().await?;

    let outcome = session.save_record().await;
    match &outcome {
        Ok(record) => {
            println!(
                "{}",
                format!("Saved '{}' as record {}", record.sample_id, record.id).green()
            );
            render::record(record);
        }
        Err(_) => {
            if let Some(notice) = session.active_notice() {
                render::notice(notice);
            }
        }
    }

    session.close().await;
    outcome?;
    Ok(())
}

pub async fn list() -> Result<()> {
    let session = open_session().await?;
    let records = session.list_history().await;
    session.close().await;

    let records = records?;
    if records.is_empty() {
        println!("{}", "No saved records".dimmed());
    }
    for record in &records {
        render::record(record);
    }
    Ok(())
}

pub async fn delete(id: &str, confirmed: bool) -> Result<()> {
    let mut session = open_session().await?;
    let outcome = session.delete_record(id, confirmed).await;
    session.close().await;

    if outcome? {
        println!("{}", format!("Deleted record {}", id).green());
    } else {
        println!("{}", Confirmation::DeleteRecord.prompt().yellow());
        println!("Re-run with --yes to confirm.");
    }
    Ok(())
}

pub async fn clear(confirmed: bool) -> Result<()> {
    let mut session = open_session().await?;
    if !confirmed {
        println!("{}", Confirmation::ClearHistory.prompt().yellow());
        println!("Re-run with --yes to confirm.");
        session.close().await;
        return Ok(());
    }

    let outcome = session.clear_history(true).await;
    if outcome.is_err() {
        if let Some(notice) = session.active_notice() {
            render::notice(notice);
        }
    }
    session.close().await;

    let removed = outcome?;
    println!("{}", format!("Deleted {} record(s)", removed).green());
    Ok(())
}
