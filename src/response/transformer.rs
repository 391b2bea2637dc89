//! Responses derived from transformer annotations.
//!
//! ```text
//! @transformer NAME
//! @transformerCollection NAME
//! @transformerModel MODEL
//! ```
//!
//! The host application owns the transformers; the crate only asks a [`TransformerRegistry`] to
//! build an example model and run it through the named transformer.

use super::{tags_named, RawResponse, ResponseStrategy, StrategyContext};
use crate::docblock::Tag;
use crate::error::Result;
use crate::route::Route;
use log::{debug, warn};
use serde_json::{json, Value};

/// Access to the host application's transformers.
pub trait TransformerRegistry {
    /// Model type the transformer accepts, when it can be read from the transformer itself
    fn model_for(&self, transformer: &str) -> Option<String>;

    /// An example instance of a model
    fn example_model(&self, model: &str) -> Result<Value>;

    /// Runs a model through a transformer
    fn transform(&self, transformer: &str, model: &Value) -> Result<Value>;
}

pub struct TransformerStrategy {
    registry: Option<Box<dyn TransformerRegistry>>,
}

impl TransformerStrategy {
    pub fn new(registry: Option<Box<dyn TransformerRegistry>>) -> Self {
        Self { registry }
    }

    fn transform(&self, registry: &dyn TransformerRegistry, tags: &[Tag]) -> Result<Option<Value>> {
        let Some(tag) = tags_named(tags, &["transformer", "transformerCollection"]).next() else {
            return Ok(None);
        };
        let transformer = first_word(&tag.content);
        let collection = tag.name == "transformerCollection";

        let model = tags_named(tags, &["transformerModel"])
            .next()
            .map(|tag| first_word(&tag.content).to_string())
            .filter(|model| !model.is_empty())
            .or_else(|| registry.model_for(transformer));
        let Some(model) = model else {
            warn!("Cannot determine the model of transformer {}", transformer);
            return Ok(None);
        };

        debug!("Transforming an example {} with {}", model, transformer);
        let instance = registry.example_model(&model)?;

        let data = if collection {
            json!([
                registry.transform(transformer, &instance)?,
                registry.transform(transformer, &instance)?
            ])
        } else {
            registry.transform(transformer, &instance)?
        };
        Ok(Some(json!({ "data": data })))
    }
}

impl ResponseStrategy for TransformerStrategy {
    fn name(&self) -> &'static str {
        "transformer"
    }

    fn attempt(&self, _route: &Route, tags: &[Tag], _context: &StrategyContext<'_>) -> Option<Vec<RawResponse>> {
        let registry = self.registry.as_deref()?;

        match self.transform(registry, tags) {
            Ok(Some(body)) => Some(vec![RawResponse::json(200, body.to_string())]),
            Ok(None) => None,
            Err(e) => {
                warn!("Transformer response failed: {}", e);
                None
            }
        }
    }
}

fn first_word(content: &str) -> &str {
    content.split_whitespace().next().unwrap_or("")
}
