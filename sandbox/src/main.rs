// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// GMS Sandbox
// Runs a short headless session of the minimal sample game.

mod collectibles;

use anyhow::{bail, Result};
use collectibles::{CollectiblesManager, ItemCollected};
use gms_sdk::prelude::*;
use std::path::PathBuf;
use std::time::Duration;

const FRAME_SECONDS: f32 = 1.0 / 60.0;
const SESSION_FRAMES: u64 = 600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GameState {
    Loading,
    Playing,
    LevelCleared,
}

fn assets_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets")
}

fn collectibles_group() -> Result<GameManagerData> {
    Ok(GameManagerData::from_ron(
        r#"(sub_manager_data_list: [(data_type_name: "CollectiblesData")])"#,
    )?)
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let source = RonFileSource::new(assets_dir());
    let mut game = GameInstance::new(InstanceSettings::default(), source)?;
    let mut state = GameState::Loading;

    if !game.wait_for_config(Duration::from_secs(5)) {
        bail!("the root configuration could not be loaded");
    }

    for frame in 0..SESSION_FRAMES {
        game.tick(FRAME_SECONDS);

        match state {
            GameState::Loading if game.try_get::<CollectiblesManager>().is_some() => {
                log::info!("Level loaded, game on");
                state = GameState::Playing;
            }
            GameState::Playing => {
                if frame % 45 == 0 {
                    game.events().trigger(|e: &mut ItemCollected| {
                        e.key = "Coin".to_string();
                        e.amount = 1;
                    });
                }
                let (coins, combo, notice) = game
                    .try_get::<CollectiblesManager>()
                    .and_then(|c| {
                        c.borrow()
                            .map(|c| (c.total("Coin"), c.combo(), c.notice_alpha()))
                    })
                    .unwrap_or_default();
                log::trace!("coins {coins}, combo {combo}, notice alpha {notice:.2}");
                if coins >= 5 {
                    log::info!(
                        "Level cleared with {coins} coins (combo {combo}), unloading collectibles"
                    );
                    game.remove_all(&collectibles_group()?)?;
                    state = GameState::LevelCleared;
                }
            }
            _ => {}
        }
    }

    let clock = game
        .try_get::<TimeManager>()
        .and_then(|time| time.borrow().map(|time| time.formatted_time()));
    if let Some(clock) = clock {
        log::info!("Session over after {clock} in state {state:?}");
    }
    Ok(())
}
