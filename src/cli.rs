use std::path::PathBuf;

use clap::Parser;

use crate::config::{
    ConverterConfig, DEFAULT_INPUT_PATH, DEFAULT_LANGUAGE, DEFAULT_MODEL, DEFAULT_OUTPUT_PATH,
    TranscriptionConfig,
};

#[derive(Parser, Debug)]
#[command(
    name = "transcribe-json",
    about = "Transcribe an audio file and save its timed segments as JSON",
    long_about = "Sends an audio file to an OpenAI-compatible transcription endpoint and writes every returned segment as {start, end, text} to a JSON file.\n\nCredentials are read from OPENAI_API_KEY; OPENAI_BASE_URL overrides the endpoint.",
    after_help = "EXAMPLES:\n    # Transcribe ./audio.mp3 into ./transcription.json\n    transcribe-json\n\n    # Pick other files\n    transcribe-json --input lecture.m4a --output lecture.json\n\n    # Verbose logging\n    RUST_LOG=debug transcribe-json"
)]
pub struct Cli {
    /// Audio file to upload
    #[arg(long, short = 'i', default_value = DEFAULT_INPUT_PATH)]
    pub input: PathBuf,

    /// Where the segment JSON is written (overwritten if present)
    #[arg(long, short = 'o', default_value = DEFAULT_OUTPUT_PATH)]
    pub output: PathBuf,

    /// Transcription model id
    #[arg(long, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Language hint passed to the service
    #[arg(long, default_value = DEFAULT_LANGUAGE)]
    pub language: String,
}

impl Cli {
    pub fn into_config(self) -> ConverterConfig {
        ConverterConfig {
            input_path: self.input,
            output_path: self.output,
            transcription: TranscriptionConfig {
                model: self.model,
                language: self.language,
                ..TranscriptionConfig::default()
            },
        }
    }
}
