//! `rodio` implementation of the audio backend.
//!
//! Previews are usually remote (`https://...`), so they are downloaded into
//! memory before decoding; local files are opened directly.

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::PathBuf;
use std::time::Duration;

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink};

use crate::track::Track;

use super::backend::{AudioBackend, Voice};
use super::types::PlaybackError;

enum Location<'a> {
    Remote(&'a str),
    Local(PathBuf),
}

fn locate(uri: &str) -> Location<'_> {
    if uri.starts_with("http://") || uri.starts_with("https://") {
        Location::Remote(uri)
    } else if let Some(path) = uri.strip_prefix("file://") {
        Location::Local(PathBuf::from(path))
    } else {
        Location::Local(PathBuf::from(uri))
    }
}

pub struct RodioBackend {
    stream: OutputStream,
    http: reqwest::blocking::Client,
}

impl RodioBackend {
    /// Open the default output device. Must run on the thread that will own it.
    pub fn open(fetch_timeout: Duration) -> Result<Self, PlaybackError> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| PlaybackError::Output(e.to_string()))?;
        // rodio logs to stderr when OutputStream is dropped. That's useful in debugging,
        // but noisy for a TUI app.
        stream.log_on_drop(false);

        let http = reqwest::blocking::Client::builder()
            .timeout(fetch_timeout)
            .build()
            .unwrap_or_default();

        Ok(Self { stream, http })
    }

    fn fetch(&self, uri: &str) -> Result<Vec<u8>, PlaybackError> {
        let fetch_err = |reason: String| PlaybackError::Fetch {
            uri: uri.to_string(),
            reason,
        };
        let resp = self
            .http
            .get(uri)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| fetch_err(e.to_string()))?;
        let bytes = resp.bytes().map_err(|e| fetch_err(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    /// Create a paused `Sink` playing `reader` from the start.
    fn sink_from<R>(&self, reader: R, uri: &str) -> Result<Sink, PlaybackError>
    where
        R: Read + Seek + Send + Sync + 'static,
    {
        let source = Decoder::new(reader).map_err(|e| PlaybackError::Decode {
            uri: uri.to_string(),
            reason: e.to_string(),
        })?;

        let sink = Sink::connect_new(self.stream.mixer());
        sink.pause();
        sink.append(source);
        Ok(sink)
    }
}

impl AudioBackend for RodioBackend {
    type Voice = Sink;

    fn load(&mut self, track: &Track) -> Result<Sink, PlaybackError> {
        match locate(&track.audio_uri) {
            Location::Remote(url) => {
                let bytes = self.fetch(url)?;
                self.sink_from(Cursor::new(bytes), &track.audio_uri)
            }
            Location::Local(path) => {
                let file = File::open(&path).map_err(|source| PlaybackError::Open {
                    path: path.clone(),
                    source,
                })?;
                self.sink_from(BufReader::new(file), &track.audio_uri)
            }
        }
    }
}

impl Voice for Sink {
    fn play(&self) {
        Sink::play(self);
    }

    fn pause(&self) {
        Sink::pause(self);
    }

    fn stop(&self) {
        Sink::stop(self);
    }

    fn set_volume(&self, volume: f32) {
        Sink::set_volume(self, volume);
    }

    fn is_finished(&self) -> bool {
        self.empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locate_distinguishes_remote_and_local() {
        assert!(matches!(
            locate("https://cdn.example.com/a.mp3"),
            Location::Remote(_)
        ));
        assert!(matches!(locate("http://x/a.mp3"), Location::Remote(_)));
        match locate("file:///music/a.flac") {
            Location::Local(p) => assert_eq!(p, PathBuf::from("/music/a.flac")),
            Location::Remote(_) => panic!("expected a local path"),
        }
        match locate("relative/a.ogg") {
            Location::Local(p) => assert_eq!(p, PathBuf::from("relative/a.ogg")),
            Location::Remote(_) => panic!("expected a local path"),
        }
    }
}
