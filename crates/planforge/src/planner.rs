//! Planner entry point that hides the simplification wiring.

use std::io::ErrorKind;
use std::path::Path;

use planforge_config::{ConfigError, SimplifierConfig};
use planforge_core::{Plan, PlanforgeError, Result, TaskSnapshot};
use planforge_simplifier::{PlanSearch, Simplifier};
use tracing::debug;

/// Simplifies `task`, runs `search` on the reduced task and returns a plan
/// for `task`.
///
/// Reads `planforge.toml` from the working directory if present and falls
/// back to the default configuration otherwise.
///
/// # Errors
///
/// Returns [`PlanforgeError::Config`] for an unreadable, malformed or
/// invalid configuration and propagates simplification and refinement
/// failures.
pub fn run_planner<S>(task: TaskSnapshot, search: S) -> Result<Option<Plan>>
where
    S: PlanSearch,
{
    let config = load_config("planforge.toml")?;
    plan_with_config(task, config, search)
}

/// Loads the configuration at `path`, or the default one if there is no
/// file at `path`.
///
/// # Errors
///
/// Returns [`PlanforgeError::Config`] if the file exists but cannot be read
/// or parsed.
pub fn load_config(path: impl AsRef<Path>) -> Result<SimplifierConfig> {
    match SimplifierConfig::load(path) {
        Ok(config) => Ok(config),
        Err(ConfigError::Io(err)) if err.kind() == ErrorKind::NotFound => {
            Ok(SimplifierConfig::default())
        }
        Err(err) => Err(PlanforgeError::Config(err.to_string())),
    }
}

/// Like [`run_planner`], with an explicit configuration.
pub fn plan_with_config<S>(
    task: TaskSnapshot,
    config: SimplifierConfig,
    mut search: S,
) -> Result<Option<Plan>>
where
    S: PlanSearch,
{
    #[cfg(feature = "console")]
    planforge_console::init();

    config
        .validate()
        .map_err(|err| PlanforgeError::Config(err.to_string()))?;
    debug!(
        event = "planner_config",
        max_layers = config.max_layers,
        abstraction = config.abstraction.enabled,
        composition = config.composition.enabled,
    );

    let simplification = Simplifier::new(config).simplify(task.into_handle())?;
    simplification.solve(&mut search)
}
