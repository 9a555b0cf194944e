use std::{
    fs::{self, File, OpenOptions},
    io::{self, BufWriter, Write},
    path::Path,
};

use anyhow::{Context, Result};
use quick_xml::escape::escape;

use crate::{
    Options,
    assets::{Attributes, GeneratedIcon, IconSet},
    config::OutputConfig,
};

const INDEX_HEADER: &str = "// THIS FILE IS AUTO GENERATED\n";

/// Recreates the collection directory and seeds its index file.
pub fn init_dir(opts: &Options, output: &OutputConfig, id: &str) -> Result<()> {
    let dir = opts.collection_dir(id);
    if dir.exists() {
        fs::remove_dir_all(&dir)
            .with_context(|| format!("could not remove {}", dir.display()))?;
    }
    fs::create_dir_all(&dir).with_context(|| format!("could not create {}", dir.display()))?;
    let index = dir.join(&output.index_file);
    fs::write(&index, INDEX_HEADER)
        .with_context(|| format!("could not write {}", index.display()))?;
    Ok(())
}

pub fn generate(opts: &Options, output: &OutputConfig, icons: &IconSet) -> Result<()> {
    let dir = opts.collection_dir(&icons.id);
    let index_path = dir.join(&output.index_file);
    let index = OpenOptions::new()
        .append(true)
        .open(&index_path)
        .with_context(|| format!("could not open {}", index_path.display()))?;
    let mut index = BufWriter::new(index);

    for icon in &icons.icons {
        writeln!(
            index,
            "export {{ default as {0} }} from './{0}.{1}';",
            icon.name, output.extension
        )?;

        let path = dir.join(format!("{}.{}", icon.name, output.extension));
        output_component(&path, &output.wrapper_import, icon)?;
    }

    index
        .flush()
        .with_context(|| format!("could not write {}", index_path.display()))?;
    Ok(())
}

fn output_component(path: &Path, wrapper_import: &str, icon: &GeneratedIcon) -> Result<()> {
    let file = File::create(path).with_context(|| format!("could not create {}", path.display()))?;
    let mut file = BufWriter::new(file);
    write_component(&mut file, wrapper_import, icon)
        .and_then(|()| file.flush())
        .with_context(|| format!("could not write {}", path.display()))?;
    Ok(())
}

fn write_component(
    out: &mut impl Write,
    wrapper_import: &str,
    icon: &GeneratedIcon,
) -> io::Result<()> {
    writeln!(out, "<script>")?;
    writeln!(out, "  import Icon from '{wrapper_import}';")?;
    writeln!(out, "</script>")?;
    writeln!(out, "<Icon{} {{...$$props}}>", attribute_list(&icon.attributes))?;
    for path in &icon.paths {
        writeln!(out, "  <path{} />", attribute_list(&path.attributes))?;
    }
    writeln!(out, "</Icon>")?;
    Ok(())
}

// `class` is left to the wrapper component.
fn attribute_list(attributes: &Attributes) -> String {
    attributes
        .iter()
        .filter(|(key, _)| *key != "class")
        .map(|(key, value)| format!(" {key}=\"{}\"", escape(value)))
        .collect()
}
