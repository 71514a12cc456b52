//! # chatlens CLI
//!
//! Command-line front end for the chatlens library.

use std::fs;
use std::process;

use chrono::Local;
use clap::Parser as ClapParser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use chatlens::ChatlensError;
use chatlens::cli::{Args, ChannelsArgs, Command, RepairArgs, ViewArgs};
use chatlens::config::IngestConfig;
use chatlens::core::{
    Dataset, QueryFilter, TWITCH_EXPORT_HEADERS, load, query, repair_file, system_clock,
};
use chatlens::format::{OutputFormat, write_to_format};

fn main() {
    let args = <Args as ClapParser>::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "chatlens=debug" } else { "chatlens=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(args: Args) -> Result<(), ChatlensError> {
    match args.command {
        Command::Channels(channels) => run_channels(&channels),
        Command::View(view) => run_view(&view),
        Command::Repair(repair) => run_repair(&repair),
    }
}

fn load_file(path: &str) -> Result<Dataset, ChatlensError> {
    let bytes = fs::read(path)?;
    load(&bytes, path, &IngestConfig::default(), system_clock())
}

fn run_channels(args: &ChannelsArgs) -> Result<(), ChatlensError> {
    let dataset = load_file(&args.input)?;
    let stats = dataset.stats();

    println!(
        "{} messages in {} channels",
        stats.total_messages, stats.total_channels
    );
    if let Some((earliest, latest)) = dataset.date_bounds() {
        println!(
            "Range: {} to {}",
            earliest.with_timezone(&Local).format("%Y-%m-%d"),
            latest.with_timezone(&Local).format("%Y-%m-%d")
        );
    }
    println!();

    let channels = match args.filter.as_deref() {
        Some(term) => dataset.filter_channels(term),
        None => dataset.channels(),
    };
    for channel in channels {
        println!("{:>8}  {}", channel.count, channel.name);
    }
    Ok(())
}

fn run_view(args: &ViewArgs) -> Result<(), ChatlensError> {
    // Validate the bounds before spending time on the load
    let mut filter = QueryFilter::new();
    if let Some(ref term) = args.search {
        filter = filter.with_search(term);
    }
    if let Some(ref from) = args.from {
        filter = filter.with_date_from(from)?;
    }
    if let Some(ref to) = args.to {
        filter = filter.with_date_to(to)?;
    }

    let dataset = load_file(&args.input)?;
    let channel = match args.channel.as_deref().or_else(|| dataset.first_channel()) {
        Some(channel) => channel.to_string(),
        None => return Ok(()),
    };
    debug!(channel = %channel, "querying channel");

    let hits = query(&dataset, &channel, &filter);

    let Some(ref output) = args.output else {
        println!("#{} ({} messages)", channel, hits.len());
        for msg in &hits {
            println!(
                "{} {}: {}",
                msg.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S"),
                msg.username,
                msg.message
            );
        }
        return Ok(());
    };

    let format = match args.format {
        Some(format) => format.into(),
        None => OutputFormat::from_path(output).unwrap_or_default(),
    };
    let messages: Vec<_> = hits.into_iter().cloned().collect();
    write_to_format(&messages, output, format, &args.output_config())?;
    eprintln!("Wrote {} messages to {} ({})", messages.len(), output, format);
    Ok(())
}

fn run_repair(args: &RepairArgs) -> Result<(), ChatlensError> {
    let stats = repair_file(&args.input, &args.output, TWITCH_EXPORT_HEADERS)?;
    eprintln!(
        "Repaired {} of {} records ({:.1}%) into {}",
        stats.rebuilt,
        stats.records,
        stats.rebuilt_ratio(),
        args.output
    );
    Ok(())
}
