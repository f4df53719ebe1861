/// Headless host: drives a level under a scripted autopilot and logs
/// what the core reports.

use std::time::{Duration, Instant};

use log::LevelFilter;
use simple_logger::SimpleLogger;

use cavern_run::config::GameConfig;
use cavern_run::domain::entity::Command;
use cavern_run::sim::event::GameEvent;
use cavern_run::sim::level::{self, LevelDef};
use cavern_run::sim::session::{Phase, Session};
use cavern_run::sim::world::WorldState;

const USAGE: &str = "usage: cavern-run [LEVEL] [--ticks N] [--retries N] [--realtime] [--list]
  LEVEL   level name, 1-based index, or path to a .toml level (default: 1)
  --retries N   restart the level up to N times after a game over (default: 0)";

const DEFAULT_TICKS: u64 = 6000;

struct Args {
    level: Option<String>,
    ticks: u64,
    retries: u32,
    realtime: bool,
    list: bool,
}

fn main() {
    // Logger first: config loading reports its fallbacks through it.
    init_logger();
    let config = GameConfig::load();
    log::set_max_level(level_filter(&config.log_level));

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(a) => a,
        Err(msg) => {
            eprintln!("{msg}\n{USAGE}");
            std::process::exit(2);
        }
    };

    let levels = level::level_list(&config);
    if args.list {
        for (i, l) in levels.iter().enumerate() {
            println!("{:>2}  {}", i + 1, l.name);
        }
        return;
    }

    let def = match pick_level(args.level.as_deref(), &levels) {
        Ok(d) => d,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    };

    let mut world = WorldState::new(config.clone());
    level::load_level(&mut world, &def);
    let mut session = Session::new();

    run(&mut world, &mut session, &args, &config);

    println!();
    println!("Level:   {}", world.level_name);
    println!("Result:  {:?}", session.phase);
    println!("Ticks:   {}", session.ticks_elapsed);
    println!("Lives:   {}", world.player.lives);
    println!("Enemies: {} / {} left", world.alive_enemies(), world.enemies.len());
}

/// Install the logger wide open and gate on the global max level, which
/// starts at `info` until the config says otherwise.
fn init_logger() {
    if let Err(e) = SimpleLogger::new().with_level(LevelFilter::Trace).init() {
        eprintln!("Logger init failed: {e}");
    }
    log::set_max_level(LevelFilter::Info);
}

fn level_filter(name: &str) -> LevelFilter {
    name.parse().unwrap_or_else(|_| {
        log::warn!("unknown log_level \"{name}\"; using info");
        LevelFilter::Info
    })
}

fn parse_args(mut it: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut args = Args { level: None, ticks: DEFAULT_TICKS, retries: 0, realtime: false, list: false };
    while let Some(a) = it.next() {
        match a.as_str() {
            "--ticks" => {
                let n = it.next().ok_or("--ticks needs a value")?;
                args.ticks = n.parse().map_err(|_| format!("bad tick count: {n}"))?;
            }
            "--retries" => {
                let n = it.next().ok_or("--retries needs a value")?;
                args.retries = n.parse().map_err(|_| format!("bad retry count: {n}"))?;
            }
            "--realtime" => args.realtime = true,
            "--list" => args.list = true,
            "-h" | "--help" => return Err(String::new()),
            other if other.starts_with("--") => return Err(format!("unknown option {other}")),
            other => args.level = Some(other.to_string()),
        }
    }
    Ok(args)
}

/// Path, then 1-based index, then case-insensitive name.
fn pick_level(wanted: Option<&str>, levels: &[LevelDef]) -> Result<LevelDef, Box<dyn std::error::Error>> {
    let wanted = match wanted {
        None => return levels.first().cloned().ok_or_else(|| "no levels available".into()),
        Some(w) => w,
    };

    if wanted.ends_with(".toml") {
        return Ok(level::load_level_file(std::path::Path::new(wanted))?);
    }
    if let Ok(n) = wanted.parse::<usize>() {
        return n.checked_sub(1)
            .and_then(|i| levels.get(i))
            .cloned()
            .ok_or_else(|| format!("no level #{n} (have {})", levels.len()).into());
    }
    levels.iter()
        .find(|l| l.name.eq_ignore_ascii_case(wanted))
        .cloned()
        .ok_or_else(|| format!("no level named \"{wanted}\"").into())
}

// ══════════════════════════════════════════════════════════════
// Loop
// ══════════════════════════════════════════════════════════════

fn run(world: &mut WorldState, session: &mut Session, args: &Args, config: &GameConfig) {
    let tick_rate = Duration::from_millis(config.tick_rate_ms);
    let mut pilot = Autopilot::new(world);
    let mut retries = args.retries;

    for _ in 0..args.ticks {
        let started = Instant::now();

        let command = pilot.command(world);
        let events = session.tick(world, command);
        log_events(&events, world);

        match session.phase {
            Phase::Playing => {}
            Phase::GameOver if retries > 0 => {
                retries -= 1;
                session.restart(world);
                pilot = Autopilot::new(world);
            }
            _ => break,
        }

        if args.realtime {
            if let Some(rest) = tick_rate.checked_sub(started.elapsed()) {
                std::thread::sleep(rest);
            }
        }
    }
}

fn log_events(events: &[GameEvent], world: &WorldState) {
    let p = &world.player.body;
    for event in events {
        match event {
            GameEvent::Jumped | GameEvent::Landed | GameEvent::HitCeiling => {
                log::trace!("t={} {:?} at ({:.1}, {:.1})", world.tick, event, p.x, p.y);
            }
            GameEvent::Detached { platform } => {
                log::debug!("t={} knocked off platform {}", world.tick, platform.0);
            }
            GameEvent::EnemyStomped { id } => log::info!("t={} stomped enemy {id}", world.tick),
            GameEvent::PlayerHit { id } => log::info!("t={} hit by enemy {id}", world.tick),
            GameEvent::PlayerFell => log::info!("t={} fell out of the world", world.tick),
            GameEvent::GoalReached => log::info!("t={} reached the goal", world.tick),
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Autopilot
// ══════════════════════════════════════════════════════════════

/// Holds right and jumps when stalled or when a pit or enemy is just ahead.
struct Autopilot {
    last_x: f32,
    stalled: u32,
}

impl Autopilot {
    fn new(world: &WorldState) -> Self {
        Autopilot { last_x: world.player.body.x, stalled: 0 }
    }

    fn command(&mut self, world: &WorldState) -> Command {
        let b = &world.player.body;

        if (b.x - self.last_x).abs() < 0.5 {
            self.stalled += 1;
        } else {
            self.stalled = 0;
        }
        self.last_x = b.x;

        let front = b.x + b.w;
        let pit_ahead = world.voids.iter().any(|v| v.contains(front + 24.0));
        let enemy_ahead = world.enemies.iter().any(|e| {
            e.alive && e.body.x >= b.x && e.body.x - front < 48.0 && (e.body.y - b.y).abs() < 48.0
        });

        Command {
            left: false,
            right: true,
            jump: b.grounded && (self.stalled > 2 || pit_ahead || enemy_ahead),
        }
    }
}
