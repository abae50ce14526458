use std::{
    path::Path,
    thread,
    time::{Duration, Instant},
};

use colored::Colorize;
use double_pendulum::{SimulationConfig, TickOutcome};
use indicatif::{ProgressBar, ProgressStyle};
use swing_result::{ResultManager, SwingResult};

use crate::SwingErrors;

const RUN_TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {percent}% {msg}";
const REALTIME_TEMPLATE: &str = "{spinner:.green} [{bar:40.cyan/blue}] {msg}";

/// Steps the pendulum with its nominal `dt` until the run length is reached, writing
/// every state, the initial one included, to `<output>/pendulum.csv`.
pub fn run(config: &SimulationConfig) -> Result<(), SwingErrors> {
    config.validate()?;
    let start_time = Instant::now();
    let mut session = config.session();
    let mut results = ResultManager::new(config.output.clone());

    let pendulum = session.pendulum_mut();
    pendulum.new_result(&mut results)?;
    pendulum.write_result(&mut results)?;
    let e0 = pendulum.energy().total;

    let expected_steps = (config.inputs.run_length / pendulum.dt()).ceil().max(0.0) as u64;
    let bar = ProgressBar::new(expected_steps);
    bar.set_style(ProgressStyle::with_template(RUN_TEMPLATE)?.progress_chars("=> "));

    tracing::info!(
        theta1 = config.inputs.theta1_deg,
        theta2 = config.inputs.theta2_deg,
        run_length = config.inputs.run_length,
        dt = session.pendulum().dt(),
        "starting run"
    );
    while !session.is_finished() {
        let pendulum = session.pendulum_mut();
        pendulum.step();
        pendulum.write_result(&mut results)?;
        bar.inc(1);
    }
    results.flush()?;
    bar.finish_with_message(session.time_display());

    let drift = session.pendulum().energy().total - e0;
    tracing::info!(energy_drift = drift, "run complete");
    println!(
        "{}",
        format!(
            "Simulation completed in {}. Results written to '{}'.",
            format_duration(start_time.elapsed()),
            results.path_of("pendulum").display()
        )
        .green()
    );
    Ok(())
}

/// Drives the session from the wall clock, one tick per frame, until the run length is
/// reached.
pub fn realtime(config: &SimulationConfig, frame_ms: u64) -> Result<(), SwingErrors> {
    config.validate()?;
    let mut session = config.session();
    let mut scheduler = config.scheduler();
    let frame = Duration::from_millis(frame_ms.max(1));

    let bar = ProgressBar::new((config.inputs.run_length * 100.0).ceil().max(0.0) as u64);
    bar.set_style(ProgressStyle::with_template(REALTIME_TEMPLATE)?.progress_chars("=> "));
    bar.set_message(session.time_display());

    tracing::info!(mode = ?scheduler.mode(), frame_ms, "starting real-time run");
    let inputs = *session.inputs();
    session.toggle(inputs);

    let clock = Instant::now();
    loop {
        let outcome = scheduler.tick(&mut session, clock.elapsed().as_secs_f64());
        let time = session.pendulum().time();
        bar.set_position((time * 100.0) as u64);
        bar.set_message(session.time_display());
        match outcome {
            TickOutcome::Finished | TickOutcome::Idle => break,
            TickOutcome::Started | TickOutcome::Stepped(_) => thread::sleep(frame),
        }
    }
    bar.finish_with_message(session.time_display());

    let tip = session.pendulum().positions().tip();
    println!(
        "{}",
        format!(
            "Finished after {} wall time, tip at ({:.3}, {:.3}).",
            format_duration(clock.elapsed()),
            tip.x,
            tip.y
        )
        .green()
    );
    Ok(())
}

pub fn init(path: &Path, force: bool) -> Result<(), SwingErrors> {
    if path.exists() && !force {
        return Err(SwingErrors::ConfigExists(path.to_path_buf()));
    }
    SimulationConfig::default().save(path)?;
    println!(
        "{}",
        format!("Config written to '{}'.", path.display()).green()
    );
    Ok(())
}

fn format_duration(duration: Duration) -> String {
    if duration.as_secs() >= 60 {
        format!("{} min, {} sec", duration.as_secs() / 60, duration.as_secs() % 60)
    } else if duration.as_secs() >= 1 {
        format!("{:.2} sec", duration.as_secs_f64())
    } else {
        format!("{} ms", duration.as_millis())
    }
}
