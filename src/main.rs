use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;

use temporal_labels::{
    CollectionStore, DISTINCT_LABELS_PATH, DirectoryStore, FileSystemProbe, IngestTemporalLabels,
    Operator,
    operator::{
        DATASET_NAME_PARAM, DATASET_PATH_PARAM, ExecutionContext, ExecutionMode, FormSchema,
        LABELS_PATH_PARAM, OVERWRITE_PARAM, PERSISTENT_PARAM,
    },
};

#[derive(Parser, Debug)]
#[command(name = "temporal-labels", version, about = "Ingest temporal step labels into video datasets")]
struct Cli {
    /// Directory holding persistent datasets
    #[arg(long, env = "TEMPORAL_LABELS_STORE", default_value = "datasets", global = true)]
    store: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a dataset from a custom temporal label file
    Ingest {
        /// Root directory containing the video(s)
        #[arg(long)]
        dataset_path: String,
        /// Custom labels JSON file
        #[arg(long)]
        labels_path: String,
        /// Name for the resulting dataset
        #[arg(long)]
        dataset_name: String,
        /// Do not keep the dataset after this process exits
        #[arg(long)]
        ephemeral: bool,
        /// Fail if a dataset with the same name exists
        #[arg(long)]
        no_overwrite: bool,
        /// Run as a delegated (background) execution
        #[arg(long)]
        delegated: bool,
    },
    /// Print the operator config and its input/output forms as JSON
    Describe,
    /// Print the distinct values of a label path in a dataset
    Distinct {
        dataset_name: String,
        #[arg(long, default_value = DISTINCT_LABELS_PATH)]
        field: String,
    },
    /// List stored datasets
    List,
    /// Delete a stored dataset
    Delete { dataset_name: String },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    let operator = IngestTemporalLabels;

    match cli.command {
        Command::Ingest {
            dataset_path,
            labels_path,
            dataset_name,
            ephemeral,
            no_overwrite,
            delegated,
        } => {
            let mut store = DirectoryStore::open(&cli.store)?;
            log::info!("Using dataset store {}", store.root().display());
            let params = json!({
                DATASET_PATH_PARAM: dataset_path,
                LABELS_PATH_PARAM: labels_path,
                DATASET_NAME_PARAM: dataset_name,
                PERSISTENT_PARAM: !ephemeral,
                OVERWRITE_PARAM: !no_overwrite,
            });
            let mode = if delegated {
                ExecutionMode::Delegated
            } else {
                ExecutionMode::Immediate
            };

            let summary = operator.run(ExecutionContext {
                params: &params,
                store: &mut store,
                probe: &FileSystemProbe,
                mode,
            })?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Describe => {
            let mut inputs = FormSchema::default();
            operator.resolve_input(&mut inputs);
            let mut outputs = FormSchema::default();
            operator.resolve_output(&mut outputs);

            let description = json!({
                "config": operator.config(),
                "inputs": inputs,
                "outputs": outputs,
            });
            println!("{}", serde_json::to_string_pretty(&description)?);
        }
        Command::Distinct {
            dataset_name,
            field,
        } => {
            let store = DirectoryStore::open(&cli.store)?;
            let dataset = store
                .load(&dataset_name)
                .with_context(|| format!("Failed to load dataset '{dataset_name}'"))?;
            let values = dataset.distinct(&field)?;
            println!("{}", serde_json::to_string_pretty(&values)?);
        }
        Command::List => {
            let store = DirectoryStore::open(&cli.store)?;
            for name in store.list_datasets()? {
                println!("{name}");
            }
        }
        Command::Delete { dataset_name } => {
            let mut store = DirectoryStore::open(&cli.store)?;
            if store.delete(&dataset_name)? {
                println!("Deleted: {dataset_name}");
            } else {
                eprintln!("No dataset named '{dataset_name}'");
            }
        }
    }

    Ok(())
}
