//! `recurrence-test`: CLI entry point for the per-label recurrence driver.

use std::fs::File;
use std::io::{self, BufWriter, Write};

use clap::Parser;

use permtest::cli::RecurrenceArgs;
use permtest::output;
use permtest::recurrence::RecurrenceDriver;
use permtest::rng::EngineRng;
use permtest::EngineError;

fn run(args: RecurrenceArgs, argv: &[String]) -> Result<(), EngineError> {
    let (mut rng, seed) = match args.random_seed {
        Some(s) => (EngineRng::seeded(s), s),
        None => EngineRng::from_clock(),
    };

    let accessible = args.accessible_regs.as_deref();
    let driver = RecurrenceDriver::load(
        accessible,
        &args.labeled_regs,
        &args.calls,
        &args.ref_fai,
        args.max_call_length,
    )?;

    let mut out: Box<dyn Write> = match &args.output {
        Some(p) => Box::new(BufWriter::new(File::create(p).map_err(|e| EngineError::Io {
            path: p.clone(),
            source: e,
        })?)),
        None => Box::new(BufWriter::new(io::stdout())),
    };

    output::write_version_cmd_seed(&mut out, argv, seed).map_err(io_err)?;

    if args.debug_regions {
        driver.debug_dump_regions(&mut out).map_err(io_err)?;
        return out.flush().map_err(io_err);
    }

    output::write_msg(&mut out, driver.sampler_err_pct).map_err(io_err)?;
    output::write_niter(&mut out, args.niter).map_err(io_err)?;
    output::write_ncalls(&mut out, driver.n_used(), driver.n_skipped).map_err(io_err)?;

    let outcome = driver.run(args.niter, &mut rng)?;

    for (i, label) in driver.labels.iter().enumerate() {
        output::write_recurrence_test(
            &mut out,
            label,
            driver.n_obs[i],
            outcome.n_few[i],
            outcome.n_eq[i],
            outcome.n_exc[i],
        )
        .map_err(io_err)?;
    }
    for (i, label) in driver.labels.iter().enumerate() {
        output::write_recurrence_dist(&mut out, label, &outcome.dist[i]).map_err(io_err)?;
    }

    out.flush().map_err(io_err)
}

fn io_err(e: io::Error) -> EngineError {
    EngineError::Io {
        path: std::path::PathBuf::from("<output>"),
        source: e,
    }
}

fn main() {
    pretty_env_logger::formatted_timed_builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let argv: Vec<String> = std::env::args().collect();
    let args = RecurrenceArgs::parse();

    if let Err(e) = run(args, &argv) {
        log::error!("{e}");
        std::process::exit(1);
    }
}
