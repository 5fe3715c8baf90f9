use std::path::PathBuf;
use std::sync::Arc;

use roster_core::config::{self, ConfigError};
use roster_core::template::TemplateMap;
use roster_core::{MaskContext, MaskRef, TickScheduler, VariableManager};

use crate::fixtures::{ComparisonFactory, Players, TextButtonBuilder, register_player_variable};

pub struct AppState {
    pub menu_path: PathBuf,
    pub menu: TemplateMap,
    pub masks: Vec<MaskRef>,
    pub players: Arc<Players>,
    pub scheduler: Arc<TickScheduler>,
    pub vars: Arc<VariableManager>,
}

impl AppState {
    /// Load the menu and start its masks. Must run inside the tokio runtime
    /// so async masks get the async lane.
    pub fn load(menu_path: PathBuf) -> Result<Self, ConfigError> {
        let menu = config::load_file(&menu_path)?;
        let players = Arc::new(Players::default());
        let vars = VariableManager::global();
        register_player_variable(&vars, Arc::clone(&players));

        let tick = config::section::millis_per_tick(&menu);
        let scheduler = Arc::new(TickScheduler::new(tick));
        let ctx = MaskContext::new(
            "roster",
            Arc::new(TextButtonBuilder),
            Arc::new(ComparisonFactory {
                vars: Arc::clone(&vars),
            }),
            Arc::clone(&scheduler) as Arc<dyn roster_core::Scheduler>,
        )
        .with_variables(Arc::clone(&vars))
        .with_players(Arc::clone(&players) as Arc<dyn roster_core::PlayerDirectory>);

        let masks = config::build_masks(&menu, &ctx)?;
        for mask in &masks {
            mask.init();
        }

        Ok(Self {
            menu_path,
            menu,
            masks,
            players,
            scheduler,
            vars,
        })
    }

    pub fn stop(&mut self) {
        for mask in self.masks.drain(..) {
            mask.stop();
        }
    }
}

impl Drop for AppState {
    fn drop(&mut self) {
        self.stop();
    }
}
