//! Sound generation
//!
//! Voices render audio from the parameters the engine publishes.

mod creak;
mod filter;
mod lfo;
mod oscillator;
mod sample;
mod sink;
mod theremin;
mod voice;

pub use creak::CreakVoice;
pub use filter::{Filter, FilterType};
pub use lfo::Lfo;
pub use oscillator::{Oscillator, Waveform};
pub use sample::{synthesize_creak, Sample};
pub use sink::VoiceSink;
pub use theremin::{ThereminVoice, DEFAULT_VIBRATO_DEPTH, DEFAULT_VIBRATO_HZ};
pub use voice::{Smoother, Voice};
