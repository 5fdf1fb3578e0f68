use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::game::Game;

/// A full, restorable copy of one game. Card identities are UUIDs, so a
/// card drawn before a save still satisfies equality and legality checks
/// after a restore.
#[derive(Debug, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub id: String,
    pub game: Game,
    pub saved_at: DateTime<Utc>,
}

impl GameSnapshot {
    pub fn new(id: String, game: Game) -> Self {
        Self {
            id,
            game,
            saved_at: Utc::now(),
        }
    }

    pub fn save(&self, dir: &PathBuf) -> std::io::Result<()> {
        let path = dir.join(format!("{}.json", self.id));
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
    }

    pub fn load(id: &str, dir: &PathBuf) -> std::io::Result<Self> {
        let path = dir.join(format!("{id}.json"));
        let json = fs::read_to_string(path)?;
        let snapshot: Self = serde_json::from_str(&json)?;
        Ok(snapshot)
    }
}

/// Directory-backed store of game snapshots, one JSON file per game.
pub struct SnapshotStore {
    pub dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: PathBuf) -> std::io::Result<Self> {
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn save(&self, id: &str, game: &Game) -> std::io::Result<()> {
        debug!(id, "saving game snapshot");
        let snapshot = GameSnapshot::new(id.to_string(), game.clone());
        snapshot.save(&self.dir)
    }

    pub fn load(&self, id: &str) -> std::io::Result<Game> {
        let snapshot = GameSnapshot::load(id, &self.dir)?;
        Ok(snapshot.game)
    }

    pub fn list(&self) -> std::io::Result<Vec<String>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if let Some(name) = entry.file_name().to_str() {
                if name.ends_with(".json") {
                    ids.push(name.trim_end_matches(".json").to_string());
                }
            }
        }
        Ok(ids)
    }

    pub fn delete(&self, id: &str) -> std::io::Result<()> {
        fs::remove_file(self.dir.join(format!("{id}.json")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::game::Event;

    fn started_game() -> Game {
        let mut game = Game::new(GameConfig::default());
        for id in 0..3 {
            game.handle_event(Event::AddPlayer {
                id,
                name: format!("player-{id}"),
            })
            .unwrap();
        }
        game.handle_event(Event::StartGame).unwrap();
        game
    }

    #[test]
    fn test_snapshot_round_trip_restores_the_game() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().to_path_buf()).unwrap();

        let game = started_game();
        store.save("g1", &game).unwrap();
        let restored = store.load("g1").unwrap();

        assert_eq!(restored, game);
    }

    #[test]
    fn test_card_identity_survives_restore() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().to_path_buf()).unwrap();

        let game = started_game();
        let current = game.current_player().unwrap().id;
        let hand_ids: Vec<_> = game
            .player(current)
            .unwrap()
            .hand
            .iter()
            .map(|c| c.id)
            .collect();
        let playable_before: Vec<_> = game.playable_cards(current).iter().map(|c| c.id).collect();

        store.save("g1", &game).unwrap();
        let restored = store.load("g1").unwrap();

        let restored_ids: Vec<_> = restored
            .player(current)
            .unwrap()
            .hand
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(restored_ids, hand_ids);

        // The legal-move subset is unchanged, so a card drawn before the
        // save can be played after the restore.
        let playable_after: Vec<_> =
            restored.playable_cards(current).iter().map(|c| c.id).collect();
        assert_eq!(playable_after, playable_before);
    }

    #[test]
    fn test_list_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().to_path_buf()).unwrap();

        store.save("a", &started_game()).unwrap();
        store.save("b", &started_game()).unwrap();

        let mut ids = store.list().unwrap();
        ids.sort();
        assert_eq!(ids, vec!["a".to_string(), "b".to_string()]);

        store.delete("a").unwrap();
        assert_eq!(store.list().unwrap(), vec!["b".to_string()]);
    }
}
