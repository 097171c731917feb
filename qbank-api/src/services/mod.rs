//! External service clients

pub mod synthesis;

pub use synthesis::{
    ExplanationSynth, HttpExplanationClient, HttpSpeechClient, SpeechSynth, SynthesisError,
};
