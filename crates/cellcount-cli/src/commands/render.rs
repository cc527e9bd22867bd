use cellcount_application::{LabSessionUseCase, Notice, NoticeKind};
use cellcount_core::counting::{CountingMode, Region, RegionCount};
use cellcount_core::history::HistoryRecord;
use cellcount_core::results::ConcentrationResults;
use cellcount_core::volume::{VolumeField, VolumePreset};
use colored::Colorize;
use strum::IntoEnumIterator;

pub fn session(session: &LabSessionUseCase) {
    let state = session.state();

    let sample = if state.sample_id.trim().is_empty() {
        "(none)".dimmed().to_string()
    } else {
        state.sample_id.bold().to_string()
    };
    println!("{} {}", "Sample:".cyan(), sample);
    println!(
        "{} {}-square",
        "Mode:".cyan(),
        state.counting_mode.squares()
    );

    let volumes: Vec<String> = VolumeField::iter()
        .map(|field| match state.volumes.get(field) {
            Some(value) => format!("{}={}", field, value),
            None => format!("{}=", field),
        })
        .collect();
    println!("{} {}", "Volumes:".cyan(), volumes.join(" "));
    if let Some(density) = state.density {
        println!("{} {}", "Density:".cyan(), density);
    }
    println!("{} {}x", "Dilution:".cyan(), session.dilution_factor());

    match state.counting_mode {
        CountingMode::FiveSquare => {
            for region in Region::iter() {
                println!("  {:<14} {}", region.label(), tally(state.board.counts.get(region)));
            }
        }
        CountingMode::ThirteenSquare => {
            println!("  {:<14} {}", "13 squares", tally(&state.board.global_counts));
        }
    }

    let outstanding = session.uncounted_count();
    if outstanding > 0 {
        println!(
            "{}",
            format!("{} square(s) still to count", outstanding).yellow()
        );
    }

    let totals = session.totals();
    println!(
        "{} live {} / dead {} / all {}",
        "Totals:".cyan(),
        totals.live,
        totals.dead,
        totals.all
    );
    results(&session.results());

    if let Some(notice) = session.active_notice() {
        self::notice(notice);
    }
}

fn tally(count: &RegionCount) -> String {
    let line = format!("live {:>4}  dead {:>4}", count.live, count.dead);
    if count.is_counted {
        format!("{} {}", line, "✓".green())
    } else {
        line.dimmed().to_string()
    }
}

pub fn results(results: &ConcentrationResults) {
    let display = results.display();
    println!(
        "{} live {} / dead {} / total {} (M cells/mL)",
        "Concentration:".cyan(),
        display.conc_live.green(),
        display.conc_dead.red(),
        display.conc_total.bold()
    );
    println!("{} {}%", "Viability:".cyan(), display.viability.bold());
}

pub fn notice(notice: &Notice) {
    match notice.kind {
        NoticeKind::Validation => eprintln!("{}", notice.message.yellow()),
        NoticeKind::Persistence => eprintln!("{}", notice.message.red()),
    }
}

pub fn record(record: &HistoryRecord) {
    let display = record.results.display();
    let density = record
        .density
        .map(|d| format!("  density {}", d))
        .unwrap_or_default();
    println!(
        "{}  {}  {}  {}-sq  df {}  live {} dead {}  total {} M/mL  viability {}%{}",
        record.id.dimmed(),
        record.timestamp.format("%Y-%m-%d %H:%M"),
        record.sample_id.bold(),
        record.mode.squares(),
        record.dilution_factor,
        record.totals.live,
        record.totals.dead,
        display.conc_total,
        display.viability,
        density
    );
}

pub fn preset_applied(preset: VolumePreset) {
    println!(
        "{}",
        format!(
            "Applied {} preset ({}x dilution)",
            preset,
            cellcount_core::volume::compute_dilution_factor(&preset.volumes())
        )
        .green()
    );
}
