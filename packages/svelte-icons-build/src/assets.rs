mod collect;
mod name;
mod svg;

use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use tracing::{debug, warn};

use crate::{
    Options,
    config::{CollectionSpec, SourceSpec},
};
use collect::resolve;
pub(crate) use name::Formatter;
use name::icon_name;
pub use svg::{Attributes, MarkupParser, ParseError, ParsedElement, XmlParser};

pub fn process(
    opts: &Options,
    parser: &impl MarkupParser,
    collection: &CollectionSpec,
) -> Result<IconSet> {
    IconProcessor::new(opts.root_dir(), parser).process(collection)
}

struct IconProcessor<'a, P> {
    root_dir: &'a Path,
    parser: &'a P,
    names: HashSet<String>,
    paths: HashSet<PathBuf>,
    icons: Vec<GeneratedIcon>,
    skipped: usize,
}

impl<'a, P: MarkupParser> IconProcessor<'a, P> {
    pub fn new(root_dir: &'a Path, parser: &'a P) -> Self {
        Self {
            root_dir,
            parser,
            names: HashSet::new(),
            paths: HashSet::new(),
            icons: vec![],
            skipped: 0,
        }
    }

    pub fn process(mut self, collection: &CollectionSpec) -> Result<IconSet> {
        for source in &collection.sources {
            self.process_source(&collection.id, source)?;
        }
        Ok(IconSet {
            id: collection.id.clone(),
            name: collection.name.clone(),
            icons: self.icons,
            skipped: self.skipped,
        })
    }

    fn process_source(&mut self, id: &str, source: &SourceSpec) -> Result<()> {
        let files = resolve(self.root_dir, &source.files)
            .with_context(|| format!("could not resolve sources for collection {id:?}"))?;
        if files.is_empty() {
            warn!(collection = id, pattern = %source.files, "source pattern matched no files");
        }
        for file in files {
            self.process_file(file, source.formatter.as_ref())?;
        }
        Ok(())
    }

    fn process_file(&mut self, file: PathBuf, formatter: Option<&Formatter>) -> Result<()> {
        if self.paths.contains(&file) {
            debug!(file = %file.display(), "skipping icon matched twice");
            self.skipped += 1;
            return Ok(());
        }

        let text = fs::read_to_string(&file)
            .with_context(|| format!("could not read icon {}", file.display()))?;
        let root = self
            .parser
            .parse(&text)
            .with_context(|| format!("could not parse icon {}", file.display()))?;

        let Some(name) = icon_name(&file, formatter) else {
            bail!("icon path {} has no file name", file.display());
        };
        if !self.names.insert(name.clone()) {
            debug!(name = %name, file = %file.display(), "skipping duplicate icon name");
            self.skipped += 1;
            return Ok(());
        }

        debug!(name = %name, file = %file.display(), "icon");
        self.paths.insert(file.clone());
        self.icons.push(GeneratedIcon::new(name, file, root));
        Ok(())
    }
}

/// All unique icons of one collection, in processing order.
pub struct IconSet {
    pub id: String,
    pub name: String,
    pub icons: Vec<GeneratedIcon>,
    /// Source files dropped as duplicates.
    pub skipped: usize,
}

pub struct GeneratedIcon {
    pub name: String,
    pub source: PathBuf,
    /// Attributes of the root `svg` element.
    pub attributes: Attributes,
    pub paths: Vec<PathElement>,
}

impl GeneratedIcon {
    pub fn new(name: String, source: PathBuf, root: ParsedElement) -> Self {
        let paths = root
            .children
            .into_iter()
            .map(|child| PathElement {
                attributes: child.attributes,
            })
            .collect();
        Self {
            name,
            source,
            attributes: root.attributes,
            paths,
        }
    }
}

/// A direct child of the root, emitted as `<path>` whatever its tag was.
pub struct PathElement {
    pub attributes: Attributes,
}
