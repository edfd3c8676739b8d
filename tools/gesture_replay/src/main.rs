mod trace;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use gesture_config_compiler::{parse_gestures_file, validate_config, GestureConfigFile};
use log::{debug, info};
use touchgrass::{
    active_config,
    config::{HoldConfig, InterruptConfig, PinchConfig, SwipeConfig, TuningConfig},
    EngineConfig, GestureEvent, GestureManager, MonitorArea,
};

use trace::{parse_expected, parse_trace, TraceSample};

#[derive(Debug, Parser)]
#[command(name = "gesture_replay")]
#[command(about = "Replay a recorded touch trace through the gesture engine")]
struct Cli {
    /// CSV trace of `touch,<ms>,<down|move|up>,<id>,<x>,<y>` and `timer,<ms>` lines.
    trace: PathBuf,
    /// File of expected event tokens, one per line.
    #[arg(long)]
    expect: Option<PathBuf>,
    /// Gesture tuning file; defaults to the configuration compiled into the engine.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    sensitivity: Option<f64>,
    #[arg(long, default_value_t = 0.0)]
    monitor_x: f64,
    #[arg(long, default_value_t = 0.0)]
    monitor_y: f64,
    #[arg(long, default_value_t = 1920.0)]
    monitor_width: f64,
    #[arg(long, default_value_t = 1080.0)]
    monitor_height: f64,
    /// Fire armed timers when the trace passes their deadline.
    #[arg(long)]
    auto_timer: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    run(&cli)
}

fn run(cli: &Cli) -> Result<()> {
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(sensitivity) = cli.sensitivity {
        if !(sensitivity.is_finite() && sensitivity > 0.0) {
            bail!("--sensitivity must be a finite value > 0, got {sensitivity}");
        }
        config.tuning.sensitivity = sensitivity;
    }
    let area = MonitorArea::new(
        cli.monitor_x,
        cli.monitor_y,
        cli.monitor_width,
        cli.monitor_height,
    );

    let samples = parse_trace(&cli.trace)?;
    info!("replaying {} samples from {}", samples.len(), cli.trace.display());
    let events = replay(&samples, area, config, cli.auto_timer);

    println!("event,ms,kind,detail");
    for (ms, event) in &events {
        println!("event,{ms},{},{}", event.label(), detail(event));
    }

    if let Some(expect_path) = &cli.expect {
        let expected = parse_expected(expect_path)?;
        let actual = expect_tokens(events.iter().map(|(_, event)| event));
        if actual != expected {
            eprintln!("expected: {}", expected.join(","));
            eprintln!("actual:   {}", actual.join(","));
            bail!("event sequence mismatch");
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(*active_config());
    };
    let file = parse_gestures_file(path)
        .with_context(|| format!("failed to load {}", path.display()))?;
    validate_config(&file).with_context(|| format!("invalid config {}", path.display()))?;
    Ok(engine_config(&file))
}

fn engine_config(file: &GestureConfigFile) -> EngineConfig {
    EngineConfig {
        tuning: TuningConfig {
            sensitivity: file.tuning.sensitivity,
            edge_margin: file.tuning.edge_margin,
            timeout_ms: file.tuning.timeout_ms,
            long_press_delay_ms: file.tuning.long_press_delay_ms,
            base_duration_ms: file.tuning.base_duration_ms,
        },
        swipe: SwipeConfig {
            threshold: file.swipe.threshold,
            edge_threshold: file.swipe.edge_threshold,
            min_lock_distance: file.swipe.min_lock_distance,
            incorrect_drag_tolerance: file.swipe.incorrect_drag_tolerance,
            initial_tolerance: file.swipe.initial_tolerance,
        },
        hold: HoldConfig {
            tolerance: file.hold.tolerance,
        },
        pinch: PinchConfig {
            threshold: file.pinch.threshold,
            incorrect_drag_tolerance: file.pinch.incorrect_drag_tolerance,
        },
        interrupt: InterruptConfig {
            finger_count: file.interrupt.finger_count,
        },
    }
}

/// Feeds every sample to a manager with the standard gestures and collects the
/// emitted events, tagged with the time of the sample that caused them.
fn replay(
    samples: &[TraceSample],
    area: MonitorArea,
    config: EngineConfig,
    auto_timer: bool,
) -> Vec<(u32, GestureEvent)> {
    let mut manager = GestureManager::with_standard_gestures(area, config);
    let mut events = Vec::new();
    let mut deadline: Option<u32> = None;

    for sample in samples {
        if auto_timer {
            if let Some(due) = deadline.filter(|due| *due <= sample.ms()) {
                debug!("timer fired at {due}");
                deadline = None;
                collect(&mut events, &mut deadline, due, manager.on_timer(due).events);
            }
        }
        let (ms, output) = match sample {
            TraceSample::Touch(event) => (event.time, manager.dispatch(*event)),
            TraceSample::Timer { ms } => (*ms, manager.on_timer(*ms)),
        };
        collect(&mut events, &mut deadline, ms, output.events);
    }

    if auto_timer {
        if let Some(due) = deadline {
            collect(&mut events, &mut deadline, due, manager.on_timer(due).events);
        }
    }
    events
}

fn collect(
    events: &mut Vec<(u32, GestureEvent)>,
    deadline: &mut Option<u32>,
    ms: u32,
    emitted: Vec<GestureEvent>,
) {
    for event in emitted {
        match event {
            GestureEvent::ArmTimer { deadline: due, .. } => *deadline = Some(due),
            GestureEvent::StopTimer => *deadline = None,
            _ => {}
        }
        events.push((ms, event));
    }
}

fn detail(event: &GestureEvent) -> String {
    match event {
        GestureEvent::Completed { gesture, .. } => gesture.to_string(),
        GestureEvent::Cancelled { kind, .. } => kind.label().to_string(),
        GestureEvent::DragBegin { drag, .. } => drag.to_string(),
        GestureEvent::DragUpdate { position, .. } => format!("{};{}", position.x, position.y),
        GestureEvent::DragEnd {
            drag, cancelled, ..
        } => {
            if *cancelled {
                format!("{drag};cancelled")
            } else {
                drag.to_string()
            }
        }
        GestureEvent::ArmTimer { deadline, .. } => deadline.to_string(),
        GestureEvent::StopTimer | GestureEvent::CancelForwarded { .. } => String::new(),
    }
}

/// Tokens compared against an expect file. Drag updates and timer bookkeeping
/// are left out so traces stay stable across small tuning changes.
fn expect_tokens<'a>(events: impl Iterator<Item = &'a GestureEvent>) -> Vec<String> {
    events
        .filter_map(|event| match event {
            GestureEvent::Completed { gesture, .. } => Some(gesture.to_string()),
            GestureEvent::Cancelled { kind, .. } => Some(format!("cancelled:{}", kind.label())),
            GestureEvent::DragBegin { .. }
            | GestureEvent::DragEnd { .. }
            | GestureEvent::CancelForwarded { .. } => Some(event.label().to_string()),
            GestureEvent::DragUpdate { .. }
            | GestureEvent::ArmTimer { .. }
            | GestureEvent::StopTimer => None,
        })
        .collect()
}
