//! Text generation implementations.

mod openai;

pub use openai::OpenAiTextGenerator;
