//! Food freshness and category classification.
//!
//! The model is prompted to answer in a fixed `Name:` / `Condition:` /
//! `Type:` / `Reason:` line format. The reply is split on those prefixes and
//! the condition and type are checked against the fixed label sets, with a
//! substring search over the whole reply as a fallback.

mod labels;

pub use labels::{Classified, Condition, FoodType, Labeled};

use serde::Serialize;
use std::path::PathBuf;

const UNKNOWN: &str = "Unknown";
const NO_REASON: &str = "No reason provided.";

/// Build the classification prompt with the label sets interpolated.
pub fn build_prompt() -> String {
    let conditions: Vec<&str> = Condition::ALL.iter().map(|c| c.label()).collect();
    let types: Vec<&str> = FoodType::ALL.iter().map(|t| t.label()).collect();

    let condition_defs: String = Condition::ALL
        .iter()
        .map(|c| format!("   - **{}**: {}\n", c.label(), c.definition()))
        .collect();
    let type_defs: String = FoodType::ALL
        .iter()
        .map(|t| format!("   - **{}**: {}\n", t.label(), t.examples()))
        .collect();

    format!(
        "Analyze the food item in the image. Classify it into three categories:\n\
         \n\
         1. FOOD NAME - Identify the specific name of the food item \
         (e.g., banana, cheddar cheese, chicken breast).\n\
         \n\
         2. FOOD CONDITION - Choose one of the following:\n\
         {condition_defs}\
         \n\
         3. FOOD TYPE - Choose one of the following based on the identified food name:\n\
         {type_defs}\
         \n\
         Respond with all three classifications and a brief explanation for your choice \
         for Condition but not Name or Type.\n\
         Use the following format exactly:\n\
         Name: [Specific food name]\n\
         Condition: [one of {}]\n\
         Type: [one of {}]\n\
         Reason: [Your brief explanation]\n",
        one_of(&conditions),
        one_of(&types),
    )
}

/// `'a', 'b', or 'c'`
fn one_of(labels: &[&str]) -> String {
    let quoted: Vec<String> = labels.iter().map(|l| format!("'{l}'")).collect();
    match quoted.split_last() {
        Some((last, rest)) if !rest.is_empty() => format!("{}, or {last}", rest.join(", ")),
        Some((last, _)) => last.clone(),
        None => String::new(),
    }
}

/// Fields recovered from a classifier reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FoodClassification {
    pub name: String,
    pub condition: Classified<Condition>,
    pub food_type: Classified<FoodType>,
    pub reason: String,
}

impl Default for FoodClassification {
    fn default() -> Self {
        Self {
            name: UNKNOWN.to_string(),
            condition: Classified::Unknown,
            food_type: Classified::Unknown,
            reason: NO_REASON.to_string(),
        }
    }
}

/// Split a reply into its prefixed lines and validate the labels.
///
/// Later lines overwrite earlier ones. Leading markdown bullets or bold
/// markers around a prefix are tolerated.
pub fn parse_response(text: &str) -> FoodClassification {
    let text = text.trim();
    let mut name = None;
    let mut condition = None;
    let mut food_type = None;
    let mut reason = None;

    for line in text.lines() {
        let line = line
            .trim_start()
            .trim_start_matches(|c: char| c == '*' || c == '-')
            .trim_start();
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        // `**Name:** x` leaves the closing bold marker glued to the value
        let value = value.strip_prefix("**").unwrap_or(value).trim().to_string();
        match key.trim_end_matches('*').to_lowercase().as_str() {
            "name" => name = Some(value),
            "condition" => condition = Some(value),
            "type" => food_type = Some(value),
            "reason" => reason = Some(value),
            _ => {}
        }
    }

    let lowered = text.to_lowercase();
    FoodClassification {
        name: name.unwrap_or_else(|| UNKNOWN.to_string()),
        condition: validate(condition, &lowered, "condition"),
        food_type: validate(food_type, &lowered, "food type"),
        reason: reason.unwrap_or_else(|| NO_REASON.to_string()),
    }
}

fn validate<T: Labeled>(value: Option<String>, lowered_reply: &str, field: &str) -> Classified<T> {
    let Some(value) = value else {
        return Classified::Unknown;
    };
    if value == UNKNOWN {
        return Classified::Unknown;
    }
    if let Some(exact) = T::from_label(&value) {
        return Classified::Known(exact);
    }
    if let Some(label) = T::ALL
        .iter()
        .find(|l| l.label().eq_ignore_ascii_case(&value))
    {
        tracing::debug!("Accepted {field} '{value}' as '{}'", label.label());
        return Classified::Known(*label);
    }

    tracing::warn!("Model returned an unexpected {field}: '{value}'");
    match T::ALL
        .iter()
        .find(|l| lowered_reply.contains(&l.label().to_lowercase()))
    {
        Some(found) => {
            tracing::info!("Recovered {field} '{}' from the reply text", found.label());
            Classified::Known(*found)
        }
        None => Classified::Unrecognized(value),
    }
}

/// Per-image result of a freshness scan.
#[derive(Debug, Clone, Serialize)]
pub struct FoodReport {
    /// Source image
    pub file_path: PathBuf,

    #[serde(flatten)]
    pub classification: FoodClassification,

    /// Good / Critical / Waste, when the condition is a known label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dashboard_status: Option<&'static str>,

    /// The model's reply verbatim
    pub raw_response: String,

    /// Model that produced the reply
    pub model: String,
}

impl FoodReport {
    pub fn from_reply(file_path: PathBuf, reply: &str, model: &str) -> Self {
        let classification = parse_response(reply);
        tracing::info!(
            "{:?}: {} / {} / {}",
            file_path,
            classification.name,
            classification.condition,
            classification.food_type
        );
        Self {
            file_path,
            dashboard_status: classification
                .condition
                .known()
                .map(|c| c.dashboard_status()),
            classification,
            raw_response: reply.to_string(),
            model: model.to_string(),
        }
    }
}
