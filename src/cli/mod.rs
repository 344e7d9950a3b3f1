pub mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lesionprep")]
#[command(about = "Dataset preprocessing glue for nnU-Net-style segmentation pipelines", long_about = None)]
struct Cli {
    /// Root directory holding the raw datasets
    #[arg(long, global = true, default_value = "nnUNet_raw")]
    raw_root: PathBuf,
    /// Root directory holding the preprocessed datasets
    #[arg(long, global = true, default_value = "nnUNet_preprocessed")]
    preprocessed_root: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fingerprint, plan and preprocess a dataset
    Preprocess {
        /// ID of the dataset to preprocess
        #[arg(long)]
        dataset_id: u32,
        /// Check dataset integrity before doing anything else
        #[arg(long)]
        check_dataset_integrity: bool,
        /// Number of processes forwarded to the external framework
        #[arg(long)]
        num_processes: Option<usize>,
        /// Recompute the dataset fingerprint even if one exists
        #[arg(long)]
        overwrite_existing_dataset_fingerprint: bool,
        /// Preprocess a test-image directory instead of the training set
        #[arg(long)]
        inference: bool,
        /// Where to store the preprocessed files in inference mode
        #[arg(long)]
        output_dir_for_inference: Option<PathBuf>,
        /// Verbose output from the external preprocessors
        #[arg(long)]
        verbose: bool,
    },
    /// Copy a precomputed validation split from imagesTr to imagesTs
    InferenceSplit {
        /// ID of the dataset to split
        #[arg(long)]
        dataset_id: u32,
        /// Key of the split in splits_final.json
        #[arg(long, default_value = "0")]
        split: String,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let paths = lesionprep::PathConfig::new(cli.raw_root, cli.preprocessed_root);

    match cli.command {
        Commands::Preprocess {
            dataset_id,
            check_dataset_integrity,
            num_processes,
            overwrite_existing_dataset_fingerprint,
            inference,
            output_dir_for_inference,
            verbose,
        } => commands::preprocess(
            paths,
            dataset_id,
            check_dataset_integrity,
            num_processes,
            overwrite_existing_dataset_fingerprint,
            inference,
            output_dir_for_inference,
            verbose,
        ),
        Commands::InferenceSplit { dataset_id, split } => {
            commands::inference_split(paths, dataset_id, &split)
        }
    }
}
