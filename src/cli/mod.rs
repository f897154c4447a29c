// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All business logic is delegated to Layer 2 (application).
//
// Two commands are supported:
//   1. `train`   — fine-tunes the model on a parallel corpus
//   2. `predict` — loads a checkpoint and transcribes a spelling

// Declare the commands submodule
pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, PredictArgs, TrainArgs};

/// The main CLI struct — clap reads the fields and generates
/// argument parsing code automatically via the Parser derive macro.
#[derive(Parser, Debug)]
#[command(
    name = "spell2pron",
    version = "0.1.0",
    about = "Fine-tune a seq2seq transformer that turns Korean spellings into pronunciations."
)]
pub struct Cli {
    /// The subcommand to run (train or predict)
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    /// This keeps the CLI layer thin — it only routes, never computes.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)   => Self::run_train(args),
            Commands::Predict(args) => Self::run_predict(args),
        }
    }

    /// Handles the `train` subcommand.
    /// Converts CLI args into a TrainConfig and hands off to Layer 2.
    fn run_train(args: TrainArgs) -> Result<()> {
        use crate::application::train_use_case::TrainUseCase;

        tracing::info!(
            "Starting fine-tuning on corpus: {} / {}",
            args.src_file,
            args.trg_file,
        );

        let use_case = TrainUseCase::new(args.into());
        use_case.execute()?;

        println!("Training complete. Checkpoint saved.");
        Ok(())
    }

    /// Handles the `predict` subcommand.
    /// Loads the model from checkpoint and prints the transcription.
    fn run_predict(args: PredictArgs) -> Result<()> {
        use crate::application::predict_use_case::PredictUseCase;
        use crate::domain::traits::PronunciationPredictor;

        let use_case = PredictUseCase::new(args.checkpoint_dir.clone())?;

        let pronunciation = use_case.predict(&args.spelling)?;
        println!("\nPronunciation: {}", pronunciation);
        Ok(())
    }
}
