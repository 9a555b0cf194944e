mod assets;
mod codegen;
mod config;

use anyhow::Result;
use tracing::info;

pub use assets::{Attributes, MarkupParser, ParseError, ParsedElement, XmlParser};
pub use config::Options;

pub fn generate(opts: Options) -> Result<Summary> {
    generate_with(opts, &XmlParser)
}

/// Like [`generate`], reading icons with a custom markup parser.
pub fn generate_with(opts: Options, parser: &impl MarkupParser) -> Result<Summary> {
    let catalog = config::parse(&opts)?;
    for collection in &catalog.collections {
        codegen::init_dir(&opts, &catalog.output, &collection.id)?;
    }

    let mut summary = Summary::default();
    for collection in &catalog.collections {
        let icons = assets::process(&opts, parser, collection)?;
        codegen::generate(&opts, &catalog.output, &icons)?;
        info!(
            collection = %icons.id,
            generated = icons.icons.len(),
            skipped = icons.skipped,
            "generated {}",
            icons.name
        );
        summary.collections.push(CollectionSummary {
            id: icons.id,
            name: icons.name,
            generated: icons.icons.len(),
            skipped: icons.skipped,
        });
    }
    Ok(summary)
}

#[derive(Debug, Default)]
pub struct Summary {
    pub collections: Vec<CollectionSummary>,
}

impl Summary {
    pub fn generated(&self) -> usize {
        self.collections.iter().map(|c| c.generated).sum()
    }
}

#[derive(Debug)]
pub struct CollectionSummary {
    pub id: String,
    pub name: String,
    pub generated: usize,
    pub skipped: usize,
}
