use cellcount_core::counting::CountingMode;
use cellcount_core::results::{Totals, compute_results};
use cellcount_core::volume::{VolumeAmounts, VolumeConfig, compute_dilution_factor};
use clap::Args;
use colored::Colorize;

use super::render;

/// Inputs for a one-off calculation. Nothing is read or stored.
#[derive(Args, Debug)]
pub struct CalcArgs {
    #[arg(long, default_value_t = 1.0)]
    sample: f64,
    #[arg(long, default_value_t = 9.0)]
    water: f64,
    #[arg(long, default_value_t = 1.0)]
    aliquot: f64,
    #[arg(long, default_value_t = 1.0)]
    stain: f64,
    /// Squares read: 5 or 13
    #[arg(long, default_value = "5", value_parser = crate::parse_mode)]
    mode: CountingMode,
    #[arg(long, default_value_t = 0)]
    live: u64,
    #[arg(long, default_value_t = 0)]
    dead: u64,
}

pub fn run(args: &CalcArgs) {
    let volumes = VolumeConfig::from_amounts(VolumeAmounts {
        sample: args.sample,
        water: args.water,
        aliquot: args.aliquot,
        stain: args.stain,
    });
    let dilution = compute_dilution_factor(&volumes);
    let totals = Totals::new(args.live, args.dead);

    println!("{} {}x", "Dilution:".cyan(), dilution);
    println!(
        "{} live {} / dead {} / all {} over {} squares",
        "Counts:".cyan(),
        totals.live,
        totals.dead,
        totals.all,
        args.mode.squares()
    );
    render::results(&compute_results(&totals, args.mode, dilution));
}
