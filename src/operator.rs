//! The `ingest-temporal-labels` operation as a host sees it.
//!
//! The host supplies a [`FormBuilder`] to collect the input/output shape and a
//! [`CollectionStore`] to run against; nothing here depends on a particular
//! plugin runtime.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::{
    ingest::{DISTINCT_LABELS_PATH, IngestOptions, create_labeled_steps_dataset},
    metadata::MetadataProbe,
    store::CollectionStore,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperatorError {
    #[error("missing required string parameter {0:?}")]
    MissingParam(&'static str),
    #[error("operator {0:?} does not allow delegated execution")]
    DelegationNotAllowed(String),
    #[error("operator {0:?} does not allow immediate execution")]
    ImmediateNotAllowed(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OperatorConfig {
    pub name: String,
    pub label: String,
    pub description: String,
    pub unlisted: bool,
    pub allow_delegated_execution: bool,
    pub allow_immediate_execution: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    #[default]
    Immediate,
    /// Queued by the host to run in the background.
    Delegated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    Str,
    Int,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub kind: PropertyKind,
    pub label: String,
    pub description: String,
    pub required: bool,
}

/// Receives the fields of an input or output form.
pub trait FormBuilder {
    fn str_field(&mut self, name: &str, label: &str, description: &str, required: bool);
    fn int_field(&mut self, name: &str, label: &str, description: &str, required: bool);
    fn view(&mut self, label: &str);
}

/// A [`FormBuilder`] that records the form, ready to be serialized for a UI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSchema {
    pub view_label: Option<String>,
    pub properties: Vec<Property>,
}

impl FormSchema {
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    fn push(&mut self, kind: PropertyKind, name: &str, label: &str, description: &str, required: bool) {
        self.properties.push(Property {
            name: name.to_owned(),
            kind,
            label: label.to_owned(),
            description: description.to_owned(),
            required,
        });
    }
}

impl FormBuilder for FormSchema {
    fn str_field(&mut self, name: &str, label: &str, description: &str, required: bool) {
        self.push(PropertyKind::Str, name, label, description, required);
    }
    fn int_field(&mut self, name: &str, label: &str, description: &str, required: bool) {
        self.push(PropertyKind::Int, name, label, description, required);
    }
    fn view(&mut self, label: &str) {
        self.view_label = Some(label.to_owned());
    }
}

/// What an operator runs against.
pub struct ExecutionContext<'a> {
    pub params: &'a Value,
    pub store: &'a mut dyn CollectionStore,
    pub probe: &'a dyn MetadataProbe,
    pub mode: ExecutionMode,
}

pub trait Operator {
    type Output: Serialize;

    fn config(&self) -> OperatorConfig;
    fn resolve_input(&self, form: &mut dyn FormBuilder);
    fn execute(&self, ctx: ExecutionContext<'_>) -> Result<Self::Output>;
    fn resolve_output(&self, form: &mut dyn FormBuilder);

    /// Checks `mode` against the config, then executes.
    fn run(&self, ctx: ExecutionContext<'_>) -> Result<Self::Output> {
        let config = self.config();
        match ctx.mode {
            ExecutionMode::Delegated if !config.allow_delegated_execution => {
                return Err(OperatorError::DelegationNotAllowed(config.name).into());
            }
            ExecutionMode::Immediate if !config.allow_immediate_execution => {
                return Err(OperatorError::ImmediateNotAllowed(config.name).into());
            }
            _ => {}
        }
        log::info!("Running operator '{}' ({:?})", config.name, ctx.mode);
        self.execute(ctx)
    }
}

pub const DATASET_PATH_PARAM: &str = "dataset_path";
pub const LABELS_PATH_PARAM: &str = "labels_path";
pub const DATASET_NAME_PARAM: &str = "dataset_name";
pub const PERSISTENT_PARAM: &str = "persistent";
pub const OVERWRITE_PARAM: &str = "overwrite";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestSummary {
    /// Number of distinct step labels, as a decimal string.
    pub num_temporal_dets: String,
}

/// Ingests a video dataset from a custom temporal detection label format.
#[derive(Debug, Clone, Copy, Default)]
pub struct IngestTemporalLabels;

impl Operator for IngestTemporalLabels {
    type Output = IngestSummary;

    fn config(&self) -> OperatorConfig {
        OperatorConfig {
            name: "ingest-temporal-labels".to_owned(),
            label: "Ingest TemporalDetections".to_owned(),
            description: "Ingests a video dataset from a custom temporal detection label format."
                .to_owned(),
            unlisted: false,
            allow_delegated_execution: true,
            allow_immediate_execution: true,
        }
    }

    fn resolve_input(&self, form: &mut dyn FormBuilder) {
        form.str_field(
            DATASET_PATH_PARAM,
            "Dataset Directory",
            "Path to root of directory containing the video(s). Can be a local path or cloud bucket directory.",
            true,
        );
        form.str_field(
            LABELS_PATH_PARAM,
            "Custom Labels File",
            "Location of the custom JSON",
            true,
        );
        form.str_field(
            DATASET_NAME_PARAM,
            "Dataset name",
            "A name for the resulting dataset",
            true,
        );
        form.view("ingest-temporal-labels parameters");
    }

    fn execute(&self, ctx: ExecutionContext<'_>) -> Result<IngestSummary> {
        let mut options = IngestOptions::new(
            required_str(ctx.params, DATASET_PATH_PARAM)?,
            required_str(ctx.params, LABELS_PATH_PARAM)?,
            required_str(ctx.params, DATASET_NAME_PARAM)?,
        );
        // Not on the form; hosts that manage dataset lifetime may pass them.
        options.persistent = optional_bool(ctx.params, PERSISTENT_PARAM, options.persistent);
        options.overwrite = optional_bool(ctx.params, OVERWRITE_PARAM, options.overwrite);

        let dataset = create_labeled_steps_dataset(&options, ctx.store, ctx.probe)?;
        let distinct_labels = dataset.distinct(DISTINCT_LABELS_PATH)?;

        Ok(IngestSummary {
            num_temporal_dets: distinct_labels.len().to_string(),
        })
    }

    fn resolve_output(&self, form: &mut dyn FormBuilder) {
        form.int_field(
            "num_temporal_dets",
            "Distinct labels found",
            "Number of distinct temporal detection labels found.",
            false,
        );
        form.view("ingestion summary");
    }
}

fn required_str<'a>(params: &'a Value, name: &'static str) -> Result<&'a str, OperatorError> {
    params
        .get(name)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .ok_or(OperatorError::MissingParam(name))
}

fn optional_bool(params: &Value, name: &str, default: bool) -> bool {
    params.get(name).and_then(Value::as_bool).unwrap_or(default)
}
