use std::{
    collections::{HashSet, VecDeque},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use regex::Regex;
use serde::Deserialize;

use crate::assets::Formatter;

const DEFAULT_CATALOG: &str = include_str!("../catalog.toml");

pub struct Options {
    root_dir: PathBuf,
    output_dir: PathBuf,
    catalog_file: Option<PathBuf>,
    only: Vec<String>,
}

impl Options {
    /// Generate into `<root>/src/lib` using the bundled catalog.
    pub fn new(root_dir: PathBuf) -> Self {
        let output_dir = root_dir.join("src").join("lib");
        Self {
            root_dir,
            output_dir,
            catalog_file: None,
            only: vec![],
        }
    }

    pub fn with_output_dir(self, output_dir: PathBuf) -> Self {
        Self { output_dir, ..self }
    }

    /// Replace the bundled catalog. Relative paths are resolved against the
    /// root directory.
    pub fn with_catalog_file(self, catalog_file: PathBuf) -> Self {
        Self {
            catalog_file: Some(catalog_file),
            ..self
        }
    }

    /// Restrict generation to the given collection ids.
    pub fn with_only(self, only: Vec<String>) -> Self {
        Self { only, ..self }
    }

    pub(crate) fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub(crate) fn collection_dir(&self, id: &str) -> PathBuf {
        self.output_dir.join(id)
    }

    fn input_path(&self, path: &Path) -> PathBuf {
        self.root_dir.join(path)
    }
}

#[derive(Deserialize, Debug)]
struct RawCatalogFile {
    #[serde(default)]
    pub imports: Vec<PathBuf>,
    #[serde(default)]
    pub output: RawOutput,
    #[serde(rename = "collection", default)]
    pub collections: Vec<RawCollection>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct RawOutput {
    pub wrapper_import: Option<String>,
    pub index_file: Option<String>,
    pub extension: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct RawCollection {
    pub id: String,
    pub name: String,
    #[serde(rename = "source", default)]
    pub sources: Vec<RawSource>,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct RawSource {
    pub files: String,
    #[serde(default)]
    pub formatter: Option<RawFormatter>,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct RawFormatter {
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub suffix: String,
    pub replace: Option<RawReplace>,
}
impl RawFormatter {
    fn compile(self) -> Result<Formatter> {
        let replace = match self.replace {
            Some(RawReplace { pattern, with }) => {
                let regex = Regex::new(&pattern)
                    .with_context(|| format!("invalid formatter pattern {pattern:?}"))?;
                Some((regex, with))
            }
            None => None,
        };
        Ok(Formatter::new(self.prefix, self.suffix, replace))
    }
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct RawReplace {
    pub pattern: String,
    pub with: String,
}

pub struct Catalog {
    pub output: OutputConfig,
    pub collections: Vec<CollectionSpec>,
}

pub struct OutputConfig {
    /// Import path of the shared wrapper component, as seen from a
    /// collection directory.
    pub wrapper_import: String,
    pub index_file: String,
    pub extension: String,
}
impl OutputConfig {
    fn from_raw(raw: RawOutput) -> Self {
        Self {
            wrapper_import: raw
                .wrapper_import
                .unwrap_or_else(|| "../Icon.svelte".to_string()),
            index_file: raw.index_file.unwrap_or_else(|| "index.ts".to_string()),
            extension: raw.extension.unwrap_or_else(|| "svelte".to_string()),
        }
    }
}

pub struct CollectionSpec {
    pub id: String,
    pub name: String,
    pub sources: Vec<SourceSpec>,
}

pub struct SourceSpec {
    pub files: String,
    pub formatter: Option<Formatter>,
}

pub fn parse(opts: &Options) -> Result<Catalog> {
    let mut output = None;
    let mut collections = vec![];
    let mut seen = HashSet::new();

    let mut files = VecDeque::new();
    match &opts.catalog_file {
        Some(path) => files.push_back(opts.input_path(path)),
        None => {
            let file: RawCatalogFile =
                toml::from_str(DEFAULT_CATALOG).context("could not parse bundled catalog")?;
            load_file(
                opts,
                file,
                opts.root_dir(),
                &mut files,
                &mut output,
                &mut collections,
            )?;
        }
    }

    while let Some(path) = files.pop_front() {
        if !seen.insert(path.clone()) {
            continue;
        }
        let file = std::fs::read_to_string(&path)
            .with_context(|| format!("could not read catalog file {}", path.display()))?;
        let file: RawCatalogFile = toml::from_str(&file)
            .with_context(|| format!("could not parse catalog file {}", path.display()))?;
        let Some(dir) = path.parent() else {
            bail!("invalid catalog file path {}", path.display());
        };
        load_file(opts, file, dir, &mut files, &mut output, &mut collections)?;
    }

    let collections = select(collections, &opts.only)?;
    Ok(Catalog {
        output: OutputConfig::from_raw(output.unwrap_or_default()),
        collections,
    })
}

fn load_file(
    opts: &Options,
    file: RawCatalogFile,
    dir: &Path,
    files: &mut VecDeque<PathBuf>,
    output: &mut Option<RawOutput>,
    collections: &mut Vec<CollectionSpec>,
) -> Result<()> {
    for import in file.imports {
        files.push_back(opts.input_path(&dir.join(import)));
    }
    // Output settings come from the top-level catalog file only.
    if output.is_none() {
        *output = Some(file.output);
    }

    for collection in file.collections {
        validate_id(&collection.id)?;
        if collections.iter().any(|c| c.id == collection.id) {
            bail!("collection {:?} is defined more than once", collection.id);
        }
        let mut sources = Vec::with_capacity(collection.sources.len());
        for source in collection.sources {
            let formatter = match source.formatter {
                Some(formatter) => Some(
                    formatter
                        .compile()
                        .with_context(|| format!("in collection {:?}", collection.id))?,
                ),
                None => None,
            };
            sources.push(SourceSpec {
                files: source.files,
                formatter,
            });
        }
        collections.push(CollectionSpec {
            id: collection.id,
            name: collection.name,
            sources,
        });
    }
    Ok(())
}

// The id names a directory that gets removed on every run.
fn validate_id(id: &str) -> Result<()> {
    if id.is_empty()
        || !id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        bail!("invalid collection id {id:?}");
    }
    Ok(())
}

fn select(collections: Vec<CollectionSpec>, only: &[String]) -> Result<Vec<CollectionSpec>> {
    if only.is_empty() {
        return Ok(collections);
    }
    for id in only {
        if !collections.iter().any(|c| &c.id == id) {
            bail!("unknown collection {id:?}");
        }
    }
    Ok(collections
        .into_iter()
        .filter(|c| only.contains(&c.id))
        .collect())
}
