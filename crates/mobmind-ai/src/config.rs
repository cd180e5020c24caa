//! Controller configuration.
//!
//! World-wide switches and tuning constants are handed to every tick through
//! [`TickContext`](crate::context::TickContext) rather than read from global
//! state. Mob families can be defined in the same file under
//! `[families.<name>]`.

use crate::mods::MobMods;
use mobmind_common::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// Configuration shared by every controller in a zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    // === World ===
    /// World-wide despawn disable
    pub mob_no_despawn: bool,

    // === Timers ===
    /// Length of the post-disengage neutral grace window
    pub neutral_time_ms: u64,
    /// Interval of the ambient roam hook
    pub roam_script_interval_ms: u64,
    /// How long a burrowing mob waits after submerging
    pub worm_submerge_ms: u64,

    // === Detection ===
    /// Height difference beyond which nothing is detected
    pub max_vertical_detect: f32,
    /// Range of the low-HP and action-based channels
    pub close_detect_range: f32,
    /// Range of ambush detection
    pub ambush_detect_range: f32,
    /// Total width of the sight cone
    pub facing_cone_degrees: f32,
    /// Targets below this HP percent trigger low-HP detection
    pub low_hp_detect_percent: u8,

    // === Roaming ===
    /// Per-step distance limit when walking home
    pub home_step_limit: f32,
    /// Fraction of max HP regenerated per roam action
    pub rest_ratio: f32,
    /// Generic buff cast chance, out of 10
    pub roam_buff_chance: u8,

    // === Combat movement ===
    /// Distance stand-back mobs keep from their target
    pub standback_range: f32,
    /// Mobs with HP stand-back stay back above this HP percent
    pub hp_standback_percent: u8,
    /// Radius of the approach path around the target
    pub approach_radius: f32,
    /// Subtracted from model size when drawing a target in
    pub draw_in_margin: f32,

    // === Spell redirects ===
    /// Party-spell redirect to the master happens one time in N
    pub master_redirect_one_in: u32,
    /// Party-spell redirect to a nearby ally happens one time in N
    pub party_redirect_one_in: u32,

    /// Named mob families
    pub families: BTreeMap<String, MobMods>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            mob_no_despawn: false,
            neutral_time_ms: 10_000,
            roam_script_interval_ms: 3_000,
            worm_submerge_ms: 2_000,
            max_vertical_detect: 8.0,
            close_detect_range: 20.0,
            ambush_detect_range: 3.0,
            facing_cone_degrees: 40.0,
            low_hp_detect_percent: 75,
            home_step_limit: 10.0,
            rest_ratio: 0.1,
            roam_buff_chance: 3,
            standback_range: 20.0,
            hp_standback_percent: 70,
            approach_radius: 2.0,
            draw_in_margin: 0.2,
            master_redirect_one_in: 2,
            party_redirect_one_in: 2,
            families: BTreeMap::new(),
        }
    }
}

impl ControllerConfig {
    /// Load configuration from a specific path.
    /// Returns default config if the file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found, using defaults");
            return Self::default();
        }

        match fs::File::open(path) {
            Ok(mut file) => {
                let mut contents = String::new();
                if let Err(e) = file.read_to_string(&mut contents) {
                    warn!("Failed to read config file: {e}");
                    return Self::default();
                }

                match Self::from_toml_str(&contents) {
                    Ok(config) => {
                        info!("Loaded config from {}", path.display());
                        config
                    },
                    Err(e) => {
                        warn!("Failed to parse config file: {e}");
                        Self::default()
                    },
                }
            },
            Err(e) => {
                warn!("Failed to open config file: {e}");
                Self::default()
            },
        }
    }

    /// Parse configuration from TOML text and clamp it.
    pub fn from_toml_str(contents: &str) -> MobmindResult<Self> {
        let mut config: Self = toml::from_str(contents)?;
        config.validate();
        Ok(config)
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> MobmindResult<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;

        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Validate and clamp configuration values to sensible ranges.
    pub fn validate(&mut self) {
        self.max_vertical_detect = self.max_vertical_detect.clamp(0.0, 100.0);
        self.close_detect_range = self.close_detect_range.clamp(0.0, 100.0);
        self.ambush_detect_range = self.ambush_detect_range.clamp(0.0, self.close_detect_range);
        self.facing_cone_degrees = self.facing_cone_degrees.clamp(1.0, 360.0);
        self.low_hp_detect_percent = self.low_hp_detect_percent.min(100);

        self.home_step_limit = self.home_step_limit.max(0.5);
        self.rest_ratio = self.rest_ratio.clamp(0.0, 1.0);
        self.roam_buff_chance = self.roam_buff_chance.min(10);

        self.hp_standback_percent = self.hp_standback_percent.min(100);
        self.approach_radius = self.approach_radius.max(0.0);
        self.draw_in_margin = self.draw_in_margin.max(0.0);

        self.master_redirect_one_in = self.master_redirect_one_in.max(1);
        self.party_redirect_one_in = self.party_redirect_one_in.max(1);

        for mods in self.families.values_mut() {
            mods.roam_rate = mods.roam_rate.max(1);
            mods.tp_use_chance = mods.tp_use_chance.min(100);
        }
    }

    /// Looks up a mob family.
    #[must_use]
    pub fn family(&self, name: &str) -> Option<&MobMods> {
        self.families.get(name)
    }

    /// Neutral grace window.
    #[must_use]
    pub fn neutral_time(&self) -> Duration {
        Duration::from_millis(self.neutral_time_ms)
    }

    /// Ambient roam hook interval.
    #[must_use]
    pub fn roam_script_interval(&self) -> Duration {
        Duration::from_millis(self.roam_script_interval_ms)
    }

    /// Burrowing wait.
    #[must_use]
    pub fn worm_submerge(&self) -> Duration {
        Duration::from_millis(self.worm_submerge_ms)
    }
}
