use rand::rngs::StdRng;
use rand::SeedableRng;
use strider_engine::{resolve_data_paths, GameApp, LoopConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::gameplay::{HighScoreStore, JsonScoreboard, MemoryScoreboard, RunnerSession};
use super::shell::RunnerApp;

const SEED_ENV_VAR: &str = "STRIDER_SEED";

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) game: Box<dyn GameApp>,
}

pub(crate) fn build_app() -> AppWiring {
    init_tracing();
    info!("=== Strider Startup ===");

    let store: Box<dyn HighScoreStore> = match resolve_data_paths() {
        Ok(paths) => {
            info!(
                root = %paths.root.display(),
                data_dir = %paths.data_dir.display(),
                "startup"
            );
            Box::new(JsonScoreboard::new(&paths.data_dir))
        }
        Err(error) => {
            warn!(error = %error, "data_dir_unavailable; high score will not persist");
            Box::new(MemoryScoreboard::new(None))
        }
    };
    let high_score = store.load().unwrap_or(0);

    let rng = match parse_seed_from_env() {
        Some(seed) => {
            info!(seed, "rng_seeded");
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };
    let session = RunnerSession::new(rng, high_score);

    AppWiring {
        config: LoopConfig::default(),
        game: Box::new(RunnerApp::new(session, store)),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn parse_seed_from_env() -> Option<u64> {
    let raw = std::env::var(SEED_ENV_VAR).ok()?;
    match raw.trim().parse::<u64>() {
        Ok(seed) => Some(seed),
        Err(_) => {
            warn!(
                env_var = SEED_ENV_VAR,
                value = raw.as_str(),
                "invalid seed env var value; using entropy"
            );
            None
        }
    }
}
