use clap::Parser;
use log::{info, warn};
use simplelog::{ConfigBuilder, WriteLogger};
use std::error::Error;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use scene_router::core::config::{self, CliOverrides, RouterConfig};
use scene_router::core::scene::SceneFile;
use scene_router::{
    BackNavigationController, BackOutcome, RawAction, Router, SceneInput, TabBackPolicy,
};

/// Script step that simulates a platform back gesture.
const HARDWARE_BACK: &str = "hardwareBack";

#[derive(Parser)]
#[command(name = "scene-router", about = "Replay navigation actions against a scene tree")]
struct Args {
    /// Scene tree file (.toml, or JSON for anything else)
    scenes: PathBuf,

    /// JSON array of actions to replay. `{"type": "hardwareBack"}` simulates a back gesture
    #[arg(short, long)]
    actions: Option<PathBuf>,

    /// Config file to use instead of ~/.scene-router/config.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// What BACK does on a tab that isn't the initial one
    #[arg(long, value_enum)]
    tab_back: Option<TabBackPolicy>,

    /// Key of the synthetic root wrapping a scene list
    #[arg(long)]
    root_key: Option<String>,

    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    let file_config = match &args.config {
        Some(path) => config::load_config_from(path)?,
        None => config::load_config().unwrap_or_else(|e| {
            eprintln!("Ignoring config file: {e}");
            RouterConfig::default()
        }),
    };
    let resolved = config::resolve(
        &file_config,
        &CliOverrides {
            root_key: args.root_key.clone(),
            tab_back: args.tab_back,
            log_level: args.log_level.clone(),
        },
    );

    // Initialize file logger - writes next to the working directory unless configured
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create(&resolved.log_file) {
        let _ = WriteLogger::init(resolved.log_level, log_config, log_file);
    }

    info!("scene-router starting with {}", args.scenes.display());

    let input = read_scenes(&args.scenes)?;
    let mut router = Router::new(input, resolved.router_options())?;
    print_state(&router)?;

    let Some(script) = &args.actions else {
        return Ok(());
    };
    let steps: Vec<RawAction> = serde_json::from_str(&fs::read_to_string(script)?)?;

    let mut back = BackNavigationController::new()
        .on_back(|| info!("Back gesture handled"))
        .on_exit(|| {
            info!("Exit requested by back gesture");
            true
        });

    for step in steps {
        if step.action_type == HARDWARE_BACK {
            let outcome = back.handle_back(&mut router);
            println!("# {HARDWARE_BACK} -> {outcome:?}");
            if matches!(outcome, BackOutcome::ExitRequested { .. }) {
                break;
            }
        } else {
            let label = format!("{} {}", step.action_type, step.key.as_deref().unwrap_or(""));
            match router.dispatch(step) {
                Ok(dispatched) => println!("# {} -> {dispatched:?}", label.trim_end()),
                Err(e) => {
                    warn!("Rejected {}: {}", label.trim_end(), e);
                    eprintln!("# {} rejected: {e}", label.trim_end());
                    continue;
                }
            }
        }
        print_state(&router)?;
    }

    Ok(())
}

fn read_scenes(path: &Path) -> Result<SceneInput, Box<dyn Error>> {
    let contents = fs::read_to_string(path)?;
    if path.extension().is_some_and(|ext| ext == "toml") {
        Ok(toml::from_str::<SceneFile>(&contents)?.into_input())
    } else {
        Ok(serde_json::from_str(&contents)?)
    }
}

fn print_state(router: &Router) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string_pretty(router.state())?);
    Ok(())
}
