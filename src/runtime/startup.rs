use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::client::{ClientError, HttpRecommender, OfflineRecommender, Recommender, TokenGetter};
use crate::config::{self, ApiSettings, OfflineSettings};
use crate::library::offline_catalog;
use crate::session::{seed_or_fallback, usable_seed};
use crate::track::Track;

/// Opening cards plus whoever answers the swipes.
pub struct Startup {
    pub tracks: Vec<Track>,
    pub recommender: Arc<dyn Recommender>,
}

/// Bearer token source: `token_file` is re-read on every call, `token` is
/// the fallback.
pub fn token_getter(api: &ApiSettings) -> TokenGetter {
    let fixed = api.token.clone();
    let file = api.token_file.clone();
    Arc::new(move || {
        if let Some(path) = &file {
            match fs::read_to_string(path) {
                Ok(s) if !s.trim().is_empty() => return Some(s.trim().to_string()),
                Ok(_) => {}
                Err(e) => log::warn!("cannot read token from {}: {e}", path.display()),
            }
        }
        fixed.clone()
    })
}

fn read_seed(path: Option<&Path>) -> Option<String> {
    let path = path?;
    match fs::read_to_string(path) {
        Ok(payload) => Some(payload),
        Err(e) => {
            log::warn!("cannot read seed {}: {e}", path.display());
            None
        }
    }
}

/// Opening cards for backend mode when no seed is usable. Their ids are
/// local catalog ordinals, so the backend may not know the tracks swiped
/// before its first replacement arrives.
fn backend_fallback_cards(offline: &OfflineSettings, initial: usize) -> Vec<Track> {
    log::warn!(
        "no usable seed; opening with {initial} local cards whose ids the backend may not recognise"
    );
    let mut catalog = offline_catalog(offline);
    catalog.truncate(initial);
    catalog
}

/// Pick the opening cards and the recommender for this run.
pub fn prepare(settings: &config::Settings, seed_path: Option<&Path>) -> Result<Startup, ClientError> {
    let seed = read_seed(seed_path);
    let initial = settings.session.initial_cards;

    if let Some(base_url) = settings.api.base_url.as_deref() {
        log::info!("recommendations from {base_url}");
        let recommender = HttpRecommender::new(
            base_url,
            Duration::from_millis(settings.api.timeout_ms),
            token_getter(&settings.api),
        )?;
        let tracks = seed_or_fallback(seed.as_deref(), || {
            backend_fallback_cards(&settings.offline, initial)
        });
        return Ok(Startup {
            tracks,
            recommender: Arc::new(recommender),
        });
    }

    log::info!("no backend configured; running offline");
    let catalog = offline_catalog(&settings.offline);
    let (tracks, recommender) = match usable_seed(seed.as_deref()) {
        Some(seeded) => {
            let recommender = OfflineRecommender::new(catalog, &seeded);
            (seeded, recommender)
        }
        None => OfflineRecommender::deal(catalog, initial),
    };
    Ok(Startup {
        tracks,
        recommender: Arc::new(recommender),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::client::Replacement;

    #[test]
    fn token_file_wins_and_is_reread() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        fs::write(&path, "first\n").unwrap();

        let get = token_getter(&ApiSettings {
            token: Some("fixed".into()),
            token_file: Some(path.clone()),
            ..ApiSettings::default()
        });
        assert_eq!(get().as_deref(), Some("first"));
        fs::write(&path, "second").unwrap();
        assert_eq!(get().as_deref(), Some("second"));
        fs::remove_file(&path).unwrap();
        assert_eq!(get().as_deref(), Some("fixed"));
    }

    #[test]
    fn no_token_configured_means_no_header() {
        assert_eq!(token_getter(&ApiSettings::default())(), None);
    }

    #[test]
    fn offline_deals_the_first_cards_from_the_catalog() {
        let startup = prepare(&Settings::default(), None).unwrap();
        assert_eq!(
            startup.tracks.iter().map(|t| t.id).collect::<Vec<_>>(),
            [1, 2, 3]
        );
        assert_eq!(
            startup.recommender.request_replacement(1, true),
            Replacement::NextTrack(crate::client::builtin_catalog()[3].clone())
        );
    }

    #[test]
    fn offline_seed_replaces_the_opening_cards() {
        let dir = tempfile::tempdir().unwrap();
        let seed = dir.path().join("seed.json");
        fs::write(
            &seed,
            r#"[{"id": 5, "title": "Five", "artist": "A", "url": "https://e/5.mp3"}]"#,
        )
        .unwrap();

        let startup = prepare(&Settings::default(), Some(&seed)).unwrap();
        assert_eq!(startup.tracks.len(), 1);
        assert_eq!(startup.tracks[0].id, 5);
        // Catalog entries other than the seeded id are dealt as replacements.
        assert_eq!(
            startup.recommender.request_replacement(5, false),
            Replacement::NextTrack(crate::client::builtin_catalog()[0].clone())
        );
    }

    #[test]
    fn empty_seed_is_kept_and_malformed_seed_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let empty = dir.path().join("empty.json");
        fs::write(&empty, "[]").unwrap();
        assert!(prepare(&Settings::default(), Some(&empty)).unwrap().tracks.is_empty());

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{oops").unwrap();
        assert_eq!(prepare(&Settings::default(), Some(&broken)).unwrap().tracks.len(), 3);

        let missing = dir.path().join("missing.json");
        assert_eq!(prepare(&Settings::default(), Some(&missing)).unwrap().tracks.len(), 3);
    }

    #[test]
    fn backend_mode_uses_the_http_client() {
        let settings = Settings {
            api: ApiSettings {
                base_url: Some("http://127.0.0.1:9".into()),
                timeout_ms: 200,
                ..ApiSettings::default()
            },
            ..Settings::default()
        };
        let startup = prepare(&settings, None).unwrap();
        assert_eq!(startup.tracks, crate::client::builtin_catalog()[..3].to_vec());
        assert!(matches!(
            startup.recommender.request_replacement(1, true),
            Replacement::TransientError(_)
        ));
    }

    #[test]
    fn backend_mode_opens_with_the_seed_when_there_is_one() {
        let dir = tempfile::tempdir().unwrap();
        let seed = dir.path().join("seed.json");
        fs::write(
            &seed,
            r#"[{"id": 41, "title": "Known", "artist": "A", "url": "https://e/41.mp3"}]"#,
        )
        .unwrap();
        let settings = Settings {
            api: ApiSettings {
                base_url: Some("http://127.0.0.1:9".into()),
                ..ApiSettings::default()
            },
            ..Settings::default()
        };

        let startup = prepare(&settings, Some(&seed)).unwrap();
        assert_eq!(startup.tracks.iter().map(|t| t.id).collect::<Vec<_>>(), [41]);
        assert_eq!(backend_fallback_cards(&settings.offline, 2).len(), 2);
    }
}
