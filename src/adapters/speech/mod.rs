//! Speech adapters.

mod mock_speech;
mod terminal_speech;
mod voice;

pub use mock_speech::{MockSpeechGateway, Utterance};
pub use terminal_speech::TerminalSpeechGateway;
pub use voice::VoiceProfile;
