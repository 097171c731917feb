//! Local playback state machine
//!
//! One reusable player per question card. Switching tracks pauses the
//! current source, assigns a cache-busted URL (so a regenerated asset is
//! never served from a stale cache), and plays. An abort raised by the
//! race between rapid consecutive plays is benign and swallowed; every
//! other sink error surfaces. Nothing here is persisted — the state dies
//! with the card.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum PlaybackError {
    /// A play request was superseded before it settled. Benign.
    #[error("Playback aborted")]
    Aborted,

    #[error("Playback error: {0}")]
    Sink(String),
}

/// Audio output seam. The embedder supplies the real sink; tests use a
/// scripted one.
pub trait AudioSink {
    fn set_source(&mut self, url: &str);
    fn play(&mut self) -> Result<(), PlaybackError>;
    fn pause(&mut self);
    fn set_volume(&mut self, volume: f64);
    /// Track length in seconds, once known.
    fn duration(&self) -> Option<f64>;
    fn position(&self) -> f64;
    fn seek(&mut self, seconds: f64);
}

/// Player state over an audio sink.
pub struct Player<S: AudioSink> {
    sink: S,
    current_url: Option<String>,
    playing: bool,
    volume: f64,
    muted: bool,
    pre_mute_volume: f64,
}

impl<S: AudioSink> Player<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            current_url: None,
            playing: false,
            volume: 1.0,
            muted: false,
            pre_mute_volume: 1.0,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// The source currently loaded (cache-busted form), e.g. for the
    /// client-side download action.
    pub fn current_source(&self) -> Option<&str> {
        self.current_url.as_deref()
    }

    /// Start playing a URL, replacing whatever was loaded. `now_ms` feeds
    /// the cache-busting query parameter.
    pub fn play_url(&mut self, url: &str, now_ms: i64) -> Result<(), PlaybackError> {
        if self.playing {
            self.sink.pause();
            self.playing = false;
        }

        let busted = cache_busted(url, now_ms);
        self.sink.set_source(&busted);
        self.current_url = Some(busted);

        match self.sink.play() {
            Ok(()) => {
                self.playing = true;
                Ok(())
            }
            // The overlapping-play race: the superseded request aborts.
            Err(PlaybackError::Aborted) => Ok(()),
            Err(err) => Err(err),
        }
    }

    /// Play/pause toggle for the loaded source.
    pub fn toggle(&mut self) -> Result<(), PlaybackError> {
        if self.current_url.is_none() {
            return Ok(());
        }
        if self.playing {
            self.sink.pause();
            self.playing = false;
            return Ok(());
        }
        match self.sink.play() {
            Ok(()) => {
                self.playing = true;
                Ok(())
            }
            Err(PlaybackError::Aborted) => Ok(()),
            Err(err) => Err(err),
        }
    }

    /// Seek from a click on the progress bar:
    /// `click_x / track_width * duration`.
    pub fn seek_fraction(&mut self, click_x: f64, track_width: f64) {
        if track_width <= 0.0 {
            return;
        }
        let Some(duration) = self.sink.duration() else {
            return;
        };
        let fraction = (click_x / track_width).clamp(0.0, 1.0);
        self.sink.seek(fraction * duration);
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Set volume in 0.0–1.0. Adjusting the slider leaves mute mode.
    pub fn set_volume(&mut self, volume: f64) {
        self.volume = volume.clamp(0.0, 1.0);
        self.muted = false;
        self.sink.set_volume(self.volume);
    }

    /// Mute toggle remembering the pre-mute volume.
    pub fn toggle_mute(&mut self) {
        if self.muted {
            self.muted = false;
            self.volume = self.pre_mute_volume;
            self.sink.set_volume(self.volume);
        } else {
            self.pre_mute_volume = self.volume;
            self.muted = true;
            self.volume = 0.0;
            self.sink.set_volume(0.0);
        }
    }

    /// Elapsed/total display, e.g. `0:07 / 2:30`.
    pub fn time_display(&self) -> String {
        let elapsed = format_time(self.sink.position());
        let total = format_time(self.sink.duration().unwrap_or(0.0));
        format!("{} / {}", elapsed, total)
    }
}

/// `M:SS` with zero-padded seconds.
pub fn format_time(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Append a timestamp query parameter so a regenerated asset defeats any
/// stale cache entry for the same URL.
pub fn cache_busted(url: &str, now_ms: i64) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}t={}", url, separator, now_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scripted sink: records calls, optionally fails the next play.
    #[derive(Default)]
    struct FakeSink {
        source: Option<String>,
        playing: bool,
        volume: f64,
        duration: Option<f64>,
        position: f64,
        next_play_error: Option<PlaybackError>,
    }

    impl AudioSink for FakeSink {
        fn set_source(&mut self, url: &str) {
            self.source = Some(url.to_string());
            self.position = 0.0;
        }

        fn play(&mut self) -> Result<(), PlaybackError> {
            if let Some(err) = self.next_play_error.take() {
                return Err(err);
            }
            self.playing = true;
            Ok(())
        }

        fn pause(&mut self) {
            self.playing = false;
        }

        fn set_volume(&mut self, volume: f64) {
            self.volume = volume;
        }

        fn duration(&self) -> Option<f64> {
            self.duration
        }

        fn position(&self) -> f64 {
            self.position
        }

        fn seek(&mut self, seconds: f64) {
            self.position = seconds;
        }
    }

    #[test]
    fn test_play_url_cache_busts_the_source() {
        let mut player = Player::new(FakeSink::default());
        player.play_url("https://cdn.test/a.mp3", 1_700_000_000_000).unwrap();

        assert_eq!(
            player.current_source(),
            Some("https://cdn.test/a.mp3?t=1700000000000")
        );
        assert!(player.is_playing());
    }

    #[test]
    fn test_cache_bust_appends_with_existing_query() {
        assert_eq!(
            cache_busted("https://cdn.test/a.mp3?v=2", 5),
            "https://cdn.test/a.mp3?v=2&t=5"
        );
        assert_eq!(cache_busted("https://cdn.test/a.mp3", 5), "https://cdn.test/a.mp3?t=5");
    }

    #[test]
    fn test_switching_tracks_pauses_previous() {
        let mut player = Player::new(FakeSink::default());
        player.play_url("https://cdn.test/a.mp3", 1).unwrap();
        player.play_url("https://cdn.test/b.mp3", 2).unwrap();

        assert!(player.current_source().unwrap().starts_with("https://cdn.test/b.mp3"));
        assert!(player.is_playing());
    }

    #[test]
    fn test_abort_during_play_race_is_swallowed() {
        let mut sink = FakeSink::default();
        sink.next_play_error = Some(PlaybackError::Aborted);
        let mut player = Player::new(sink);

        // The superseded play settles as an abort; not an error.
        assert!(player.play_url("https://cdn.test/a.mp3", 1).is_ok());
    }

    #[test]
    fn test_other_play_errors_surface() {
        let mut sink = FakeSink::default();
        sink.next_play_error = Some(PlaybackError::Sink("decode failed".to_string()));
        let mut player = Player::new(sink);

        assert!(player.play_url("https://cdn.test/a.mp3", 1).is_err());
        assert!(!player.is_playing());
    }

    #[test]
    fn test_seek_fraction_maps_click_to_duration() {
        let mut sink = FakeSink::default();
        sink.duration = Some(200.0);
        let mut player = Player::new(sink);
        player.play_url("https://cdn.test/a.mp3", 1).unwrap();

        player.seek_fraction(150.0, 300.0);
        assert_eq!(player.sink.position, 100.0);

        // Clicks past the end clamp to the end.
        player.seek_fraction(400.0, 300.0);
        assert_eq!(player.sink.position, 200.0);
    }

    #[test]
    fn test_mute_remembers_pre_mute_volume() {
        let mut player = Player::new(FakeSink::default());
        player.set_volume(0.4);

        player.toggle_mute();
        assert!(player.is_muted());
        assert_eq!(player.volume(), 0.0);

        player.toggle_mute();
        assert!(!player.is_muted());
        assert_eq!(player.volume(), 0.4);
    }

    #[test]
    fn test_time_display_formats_minutes_seconds() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(7.9), "0:07");
        assert_eq!(format_time(150.0), "2:30");
        assert_eq!(format_time(3600.0), "60:00");
    }

    #[test]
    fn test_toggle_without_source_is_a_no_op() {
        let mut player = Player::new(FakeSink::default());
        assert!(player.toggle().is_ok());
        assert!(!player.is_playing());
    }
}
