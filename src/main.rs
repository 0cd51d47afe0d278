//! RPS Arena entry point
//!
//! Runs the arena headless and logs each winner:
//!
//! ```text
//! rps-arena [local|remote] [runs]
//! ```
//!
//! The browser build drives `rps_arena::web::WebSimulation` instead.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use rps_arena::sim::Kind;
    use rps_arena::sync::{Event, LocalSession, RemoteServer};
    use rps_arena::{RunResult, Settings, WinTally};

    const ARENA_WIDTH: f32 = 800.0;
    const ARENA_HEIGHT: f32 = 600.0;
    /// Give up on a run that has not converged after this many ticks
    const MAX_TICKS_PER_RUN: u64 = 200_000;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Mode {
        Local,
        Remote,
    }

    struct Args {
        mode: Mode,
        runs: u64,
    }

    fn parse_args() -> Result<Args, String> {
        let mut args = std::env::args().skip(1);
        let mode = match args.next().as_deref() {
            None | Some("local") => Mode::Local,
            Some("remote") => Mode::Remote,
            Some(other) => return Err(format!("unknown mode '{}'", other)),
        };
        let runs = match args.next() {
            None => 3,
            Some(text) => text
                .parse()
                .map_err(|_| format!("runs must be a positive integer, got '{}'", text))?,
        };
        if runs == 0 {
            return Err("runs must be at least 1".to_string());
        }
        Ok(Args { mode, runs })
    }

    /// Tick a local session as fast as possible
    fn run_local(settings: Settings, runs: u64, tally: &mut WinTally) -> Result<(), String> {
        let mut session = LocalSession::new(settings, Vec::new()).map_err(|e| e.to_string())?;
        session
            .start(ARENA_WIDTH, ARENA_HEIGHT)
            .map_err(|e| e.to_string())?;
        session.sink_mut().clear();

        let mut since_start = 0u64;
        while tally.total_runs() < runs {
            let Some(snapshot) = session.tick() else {
                return Err("session lost its run".to_string());
            };
            since_start += 1;

            for event in session.sink_mut().drain(..) {
                match event {
                    Event::SimulationStarted { .. } => since_start = 0,
                    Event::SimulationComplete { winner } => {
                        record(tally, snapshot.run, winner, snapshot.tick);
                    }
                    Event::UpdateSimulation { .. } | Event::CommandRejected { .. } => {}
                }
            }

            if since_start > MAX_TICKS_PER_RUN {
                log::warn!(
                    "Run {} still mixed after {} ticks, resetting",
                    snapshot.run,
                    since_start
                );
                session.reset().map_err(|e| e.to_string())?;
                session.sink_mut().clear();
                since_start = 0;
            }
        }
        Ok(())
    }

    /// Spawn an authority thread and watch it as one observer
    fn run_remote(settings: Settings, runs: u64, tally: &mut WinTally) -> Result<(), String> {
        let patience = settings.tick_interval() * 50;
        let server = RemoteServer::spawn(settings).map_err(|e| e.to_string())?;
        let mut observer = server.connect();
        if !observer.start(ARENA_WIDTH, ARENA_HEIGHT) {
            return Err("authority thread is not accepting commands".to_string());
        }

        let mut run = 0u64;
        let mut ticks = 0u64;
        while tally.total_runs() < runs {
            let Some(event) = observer.poll_timeout(patience) else {
                return Err(format!("no event from the authority within {:?}", patience));
            };
            match event {
                Event::SimulationStarted { .. } => {
                    run += 1;
                    ticks = 0;
                }
                Event::UpdateSimulation { .. } => ticks += 1,
                Event::SimulationComplete { winner } => record(tally, run, winner, ticks),
                Event::CommandRejected { reason } => {
                    return Err(format!("authority rejected the run: {}", reason));
                }
            }
        }
        server.shutdown();
        Ok(())
    }

    fn record(tally: &mut WinTally, run: u64, winner: Kind, ticks: u64) {
        log::info!("Run {}: {} wins after {} ticks", run, winner, ticks);
        tally.record(RunResult { run, winner, ticks });
    }

    pub fn run() -> Result<(), String> {
        let args = parse_args()?;
        let settings = Settings::load();
        let mut tally = WinTally::new();

        log::info!("RPS arena ({:?}) running {} runs", args.mode, args.runs);
        match args.mode {
            Mode::Local => run_local(settings, args.runs, &mut tally)?,
            Mode::Remote => run_remote(settings, args.runs, &mut tally)?,
        }

        for (kind, wins) in tally.leaderboard() {
            log::info!("{:>8}: {} wins", kind.as_str(), wins);
        }
        if let Some(mean) = tally.mean_recent_ticks() {
            log::info!("Mean ticks to convergence: {:.0}", mean);
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(e) = headless::run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The browser entry point is rps_arena::web::WebSimulation
}
