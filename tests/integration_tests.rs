use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tempfile::TempDir;

use soundpool::config::EngineConfig;
use soundpool::engine::SoundEngine;
use soundpool::session::{MockSession, SoundCategory};
use soundpool::settings::{JsonFileSettingsStore, MemorySettingsStore, SettingsStore};
use soundpool::sound::{
    AssetIdentity, DirectoryResolver, MockPlayerFactory, Player, Sound, SoundError,
};

const SETTINGS_KEY: &str = "soundpool.sound.disabled";

struct Harness {
    dir: TempDir,
    factory: Arc<MockPlayerFactory>,
    engine: SoundEngine,
}

impl Harness {
    fn new() -> Self {
        Self::with_store(Arc::new(MemorySettingsStore::new()), EngineConfig::default())
    }

    fn with_store(store: Arc<dyn SettingsStore>, config: EngineConfig) -> Self {
        let dir = tempfile::tempdir().unwrap();
        write_asset(dir.path(), "dog.wav");
        write_asset(dir.path(), "cat.mp3");
        std::fs::write(dir.path().join("silent.wav"), b"").unwrap();

        let factory = Arc::new(MockPlayerFactory::new());
        let engine = SoundEngine::with_config(factory.clone(), store, config)
            .with_resolver(Arc::new(DirectoryResolver::new(dir.path())));
        Self {
            dir,
            factory,
            engine,
        }
    }

    fn asset(&self, file: &str) -> AssetIdentity {
        AssetIdentity::from_path(self.dir.path().join(file))
    }
}

fn write_asset(dir: &Path, file: &str) {
    std::fs::write(dir.join(file), b"RIFF....WAVEfmt ").unwrap();
}

mod pool_behavior {
    use super::*;

    #[test]
    fn sound_without_any_player_fails_to_build() {
        let h = Harness::new();
        h.factory.set_should_fail(true);

        let result = h.engine.sound(&h.asset("dog.wav"));
        assert!(matches!(result, Err(SoundError::NoPlayers { attempts: 5, .. })));
    }

    #[test]
    fn zero_length_asset_is_not_playable() {
        let h = Harness::new();
        assert!(!h.engine.play_file("silent", Some("wav"), 0));
        assert_eq!(h.engine.registered_count(), 0);
    }

    #[test]
    fn partial_pool_keeps_built_players() {
        let h = Harness::new();
        h.factory.set_success_limit(Some(2));

        let sound = h.engine.sound(&h.asset("dog.wav")).unwrap();
        assert_eq!(sound.player_count(), 2);
        assert!(sound.play());
    }

    #[test]
    fn consecutive_plays_cover_whole_pool() {
        let h = Harness::new();
        let sound = h.engine.sound(&h.asset("dog.wav")).unwrap();

        for _ in 0..h.engine.players_per_sound() {
            assert!(sound.play());
        }
        for player in h.factory.players_for(sound.asset()) {
            assert_eq!(player.play_count(), 1);
        }
    }

    #[test]
    fn overlapping_plays_use_distinct_players() {
        let h = Harness::new();
        let sound = h.engine.sound(&h.asset("dog.wav")).unwrap();

        sound.play();
        sound.play();

        let playing = h
            .factory
            .players_for(sound.asset())
            .iter()
            .filter(|p| p.is_playing())
            .count();
        assert_eq!(playing, 2);
    }
}

mod sound_controls {
    use super::*;

    #[test]
    fn pause_then_resume_restores_playing() {
        let h = Harness::new();
        let sound = h.engine.sound(&h.asset("dog.wav")).unwrap();

        sound.play();
        sound.pause();
        assert!(sound.is_paused());
        assert!(!sound.is_playing());

        assert!(sound.resume());
        assert!(!sound.is_paused());
        assert!(sound.is_playing());
        assert!(!sound.resume());
    }

    #[test]
    fn stop_silences_every_player() {
        let h = Harness::new();
        let sound = h.engine.sound(&h.asset("dog.wav")).unwrap();

        sound.play_looping(-1);
        sound.play_looping(-1);
        sound.play_looping(-1);
        sound.stop();

        for player in h.factory.players_for(sound.asset()) {
            assert!(!player.is_playing());
        }
        assert!(!sound.is_playing());
    }

    #[test]
    fn completion_fires_once_on_natural_end() {
        let h = Harness::new();
        let sound = h.engine.sound(&h.asset("dog.wav")).unwrap();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);

        assert!(sound.play_with(
            0,
            Some(Box::new(move |ok| {
                assert!(ok);
                counter.fetch_add(1, Ordering::SeqCst);
            }))
        ));

        let player = h
            .factory
            .players_for(sound.asset())
            .into_iter()
            .find(|p| p.has_pending_completion())
            .unwrap();
        assert!(player.finish());
        assert!(!player.finish());
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn stop_discards_pending_completion() {
        let h = Harness::new();
        let sound = h.engine.sound(&h.asset("dog.wav")).unwrap();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);

        sound.play_with(
            0,
            Some(Box::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })),
        );
        sound.stop();

        for player in h.factory.players_for(sound.asset()) {
            assert!(!player.finish());
        }
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn volume_fans_out_and_clamps() {
        let h = Harness::new();
        let sound = h.engine.sound(&h.asset("dog.wav")).unwrap();

        sound.set_volume(0.25);
        assert!((sound.volume() - 0.25).abs() < f32::EPSILON);

        sound.fade_volume(2.0, Duration::from_millis(300));
        for player in h.factory.players_for(sound.asset()) {
            assert_eq!(player.fades(), vec![(1.0, Duration::from_millis(300))]);
        }
    }
}

mod registry_behavior {
    use super::*;

    #[test]
    fn repeated_play_reuses_registered_sound() {
        let h = Harness::new();

        assert!(h.engine.play_file("dog", Some("wav"), 0));
        assert!(h.engine.play_file("dog", Some(".wav"), 0));
        assert!(h.engine.play_url(
            &format!("file://{}", h.asset("dog.wav").path().display()),
            0
        ));

        assert_eq!(h.engine.registered_count(), 1);
        assert_eq!(h.factory.create_count(), h.engine.players_per_sound());
    }

    #[test]
    fn escaped_file_url_shares_entry_with_name() {
        let h = Harness::new();
        write_asset(h.dir.path(), "my dog.wav");
        let url = format!("file://{}", h.dir.path().join("my%20dog.wav").display());

        assert!(h.engine.play_url(&url, 0));
        assert!(h.engine.play_file("my dog", Some("wav"), 0));

        assert_eq!(h.engine.registered_count(), 1);
        assert!(h.engine.registered(&h.asset("my dog.wav")).is_some());
        assert_eq!(h.factory.create_count(), h.engine.players_per_sound());
    }

    #[test]
    fn name_without_extension_finds_supported_file() {
        let h = Harness::new();
        assert!(h.engine.play_file("cat", None, 0));
        assert!(h.engine.registered(&h.asset("cat.mp3")).is_some());
    }

    #[test]
    fn unresolvable_name_plays_nothing() {
        let h = Harness::new();
        assert!(!h.engine.play_file("nonexistent", Some("mp3"), 0));
        assert_eq!(h.factory.create_count(), 0);

        let err = h.engine.sound_for_file("nonexistent", Some("mp3")).unwrap_err();
        assert!(matches!(err, SoundError::AssetNotFound(ref name) if name == "nonexistent.mp3"));
    }

    #[test]
    fn stop_file_stops_registered_sound() {
        let h = Harness::new();
        h.engine.play_file("dog", Some("wav"), -1);

        let sound = h.engine.registered(&h.asset("dog.wav")).unwrap();
        assert!(sound.is_playing());

        h.engine.stop_file("dog", Some("wav"));
        assert!(!sound.is_playing());

        // Unknown names are a no-op
        h.engine.stop_file("nonexistent", Some("wav"));
    }

    #[test]
    fn pool_size_change_resets_registry() {
        let h = Harness::new();
        h.engine.play_file("dog", Some("wav"), -1);
        let held = h.engine.registered(&h.asset("dog.wav")).unwrap();

        h.engine.set_players_per_sound(2);
        assert_eq!(h.engine.registered_count(), 0);
        assert!(!held.is_playing());
        assert_eq!(held.player_count(), 5);

        h.factory.clear_calls();
        h.engine.play_file("dog", Some("wav"), 0);
        assert_eq!(h.factory.create_count(), 2);
    }

    #[test]
    fn pool_size_is_at_least_one() {
        let h = Harness::new();
        h.engine.set_players_per_sound(0);
        assert_eq!(h.engine.players_per_sound(), 1);
    }
}

mod stop_broadcast {
    use super::*;

    #[test]
    fn stop_all_reaches_unregistered_sounds() {
        let h = Harness::new();
        let owned = h.engine.sound(&h.asset("cat.mp3")).unwrap();
        h.engine.play_file("dog", Some("wav"), -1);
        owned.play_looping(-1);

        assert_eq!(h.engine.stop_all(), 2);
        assert!(!owned.is_playing());
        assert!(!h.engine.registered(&h.asset("dog.wav")).unwrap().is_playing());
    }

    #[test]
    fn dropped_sounds_leave_the_broadcast() {
        let h = Harness::new();
        let sound = h.engine.sound(&h.asset("cat.mp3")).unwrap();
        assert_eq!(h.engine.live_sound_count(), 1);

        drop(sound);
        assert_eq!(h.engine.live_sound_count(), 0);
        assert_eq!(h.engine.stop_all(), 0);
    }

    #[test]
    fn stop_all_from_many_threads() {
        let h = Arc::new(Harness::new());
        let sounds: Vec<Sound> = (0..4)
            .map(|_| h.engine.sound(&h.asset("dog.wav")).unwrap())
            .collect();
        for sound in &sounds {
            sound.play_looping(-1);
        }

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let h = Arc::clone(&h);
                thread::spawn(move || h.engine.stop_all())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), 4);
        }
        assert!(sounds.iter().all(|s| !s.is_playing()));
    }
}

mod global_gate {
    use super::*;

    #[test]
    fn disabling_blocks_both_paths_and_stops_playback() {
        let h = Harness::new();
        let owned = h.engine.sound(&h.asset("cat.mp3")).unwrap();
        owned.play_looping(-1);

        h.engine.set_enabled(false);
        assert!(!owned.is_playing());
        assert!(!owned.play());
        assert!(!h.engine.play_file("dog", Some("wav"), 0));

        h.engine.set_enabled(true);
        assert!(owned.play());
        assert!(h.engine.play_file("dog", Some("wav"), 0));
    }

    #[test]
    fn setting_is_idempotent() {
        let h = Harness::new();
        h.engine.set_enabled(false);
        h.engine.set_enabled(false);
        assert!(!h.engine.is_enabled());
        h.engine.set_enabled(true);
        h.engine.set_enabled(true);
        assert!(h.engine.is_enabled());
    }

    #[test]
    fn setting_survives_restart() {
        let settings_dir = tempfile::tempdir().unwrap();
        let path = settings_dir.path().join("settings.json");

        let first = Harness::with_store(
            Arc::new(JsonFileSettingsStore::new(&path)),
            EngineConfig::default(),
        );
        assert!(first.engine.is_enabled());
        first.engine.set_enabled(false);

        let store = JsonFileSettingsStore::new(&path);
        assert_eq!(store.get_bool(SETTINGS_KEY).unwrap(), Some(true));

        let second = Harness::with_store(Arc::new(store), EngineConfig::default());
        assert!(!second.engine.is_enabled());
        assert!(!second.engine.play_file("dog", Some("wav"), 0));
    }
}

mod session_category {
    use super::*;

    #[test]
    fn category_applied_once_before_first_sound() {
        let h = Harness::new();
        let session = Arc::new(MockSession::new());
        let engine = SoundEngine::with_config(
            h.factory.clone(),
            Arc::new(MemorySettingsStore::new()),
            EngineConfig::default().with_category(SoundCategory::Playback),
        )
        .with_session(session.clone());

        assert_eq!(session.call_count(), 0);
        let _a = engine.sound(&h.asset("dog.wav")).unwrap();
        let _b = engine.sound(&h.asset("cat.mp3")).unwrap();
        assert_eq!(session.calls(), vec![SoundCategory::Playback]);

        engine.set_category(SoundCategory::Ambient);
        assert_eq!(
            session.calls(),
            vec![SoundCategory::Playback, SoundCategory::Ambient]
        );
    }

    #[test]
    fn rejected_category_does_not_block_playback() {
        let h = Harness::new();
        let session = Arc::new(MockSession::new());
        session.set_should_fail(true);
        let engine = SoundEngine::new(h.factory.clone(), Arc::new(MemorySettingsStore::new()))
            .with_resolver(Arc::new(DirectoryResolver::new(h.dir.path())))
            .with_session(session.clone());

        assert!(engine.play_file("dog", Some("wav"), 0));
        assert_eq!(session.call_count(), 1);
    }
}
