use std::{
    fs,
    path::{Path, PathBuf},
};

use pretty_assertions::assert_eq;
use svelte_icons_build::{Options, generate};

const CATALOG: &str = r#"
[[collection]]
id = "io"
name = "Ionicons"

[[collection.source]]
files = "node_modules/ionicons/svg/*.svg"
formatter = { prefix = "Io" }

[[collection]]
id = "md"
name = "Material Design icons"

[[collection.source]]
files = "icons/material-design-icons/*/svg/production/*_24px.svg"
formatter = { replace = { pattern = '(?i)Ic(\w+)24px', with = "Md${1}" } }

[[collection]]
id = "hi"
name = "Heroicons"

[[collection.source]]
files = "icons/heroicons/{solid,outline}/*.svg"
formatter = { prefix = "Hi" }
"#;

fn write(root: &Path, path: &str, text: &str) {
    let path = root.join(path);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

fn fixture() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(root, "icons.toml", CATALOG);
    write(
        root,
        "node_modules/ionicons/svg/arrow-left.svg",
        r#"<svg xmlns="http://www.w3.org/2000/svg" class="ionicon" viewBox="0 0 512 512"><style>.a{fill:none}</style><path class="a" d="M244 400L100 256"/><path d="M120 256h292"/></svg>"#,
    );
    write(
        root,
        "node_modules/ionicons/svg/arrow_left.svg",
        r#"<svg viewBox="0 0 1 1"><path d="X"/></svg>"#,
    );
    write(
        root,
        "node_modules/ionicons/svg/bell.svg",
        r#"<svg viewBox="0 0 24 24" width="24"><path d="M1 1"/></svg>"#,
    );
    write(
        root,
        "icons/material-design-icons/action/svg/production/ic_3d_rotation_24px.svg",
        r#"<svg viewBox="0 0 24 24"><path d="M0 0"/></svg>"#,
    );
    write(
        root,
        "icons/material-design-icons/action/svg/production/ic_3d_rotation_48px.svg",
        r#"<svg viewBox="0 0 48 48"><path d="M0 0"/></svg>"#,
    );
    write(
        root,
        "icons/material-design-icons/alert/svg/production/ic_error_24px.svg",
        r#"<svg viewBox="0 0 24 24"><path d="M1 1"/></svg>"#,
    );
    write(
        root,
        "icons/heroicons/solid/bell.svg",
        r#"<svg viewBox="0 0 20 20"><path d="S"/></svg>"#,
    );
    write(
        root,
        "icons/heroicons/outline/bell.svg",
        r#"<svg viewBox="0 0 24 24"><path d="O"/></svg>"#,
    );
    dir
}

fn options(root: &Path) -> Options {
    Options::new(root.to_path_buf()).with_catalog_file(PathBuf::from("icons.toml"))
}

fn read(root: &Path, path: &str) -> String {
    fs::read_to_string(root.join("src/lib").join(path)).unwrap()
}

fn snapshot(dir: &Path) -> Vec<(String, String)> {
    let mut files = vec![];
    for collection in fs::read_dir(dir).unwrap() {
        let collection = collection.unwrap().path();
        for file in fs::read_dir(&collection).unwrap() {
            let file = file.unwrap().path();
            files.push((
                file.strip_prefix(dir).unwrap().to_string_lossy().into_owned(),
                fs::read_to_string(&file).unwrap(),
            ));
        }
    }
    files.sort();
    files
}

#[test]
fn generates_components_and_indexes() {
    let dir = fixture();
    let root = dir.path();
    let summary = generate(options(root)).unwrap();

    let counts: Vec<_> = summary
        .collections
        .iter()
        .map(|c| (c.id.as_str(), c.generated, c.skipped))
        .collect();
    assert_eq!(counts, [("io", 2, 1), ("md", 2, 0), ("hi", 1, 1)]);

    assert_eq!(
        read(root, "io/index.ts"),
        "// THIS FILE IS AUTO GENERATED\n\
         export { default as IoArrowLeft } from './IoArrowLeft.svelte';\n\
         export { default as IoBell } from './IoBell.svelte';\n"
    );
    assert_eq!(
        read(root, "io/IoArrowLeft.svelte"),
        r#"<script>
  import Icon from '../Icon.svelte';
</script>
<Icon xmlns="http://www.w3.org/2000/svg" viewBox="0 0 512 512" {...$$props}>
  <path d="M244 400L100 256" />
  <path d="M120 256h292" />
</Icon>
"#
    );
    assert!(
        read(root, "io/IoBell.svelte")
            .contains(r#"<Icon viewBox="0 0 24 24" width="24" {...$$props}>"#)
    );

    assert_eq!(
        read(root, "md/index.ts"),
        "// THIS FILE IS AUTO GENERATED\n\
         export { default as Md3DRotation } from './Md3DRotation.svelte';\n\
         export { default as MdError } from './MdError.svelte';\n"
    );

    // `outline` sorts before `solid`, so the outline variant wins.
    assert!(read(root, "hi/HiBell.svelte").contains(r#"<path d="O" />"#));
}

#[test]
fn output_is_deterministic_and_stale_files_are_removed() {
    let dir = fixture();
    let root = dir.path();
    let out = root.join("src/lib");

    generate(options(root)).unwrap();
    let first = snapshot(&out);

    fs::write(out.join("io/IoStale.svelte"), "stale").unwrap();
    generate(options(root)).unwrap();
    let second = snapshot(&out);

    assert_eq!(first, second);
}

#[test]
fn only_limits_collections() {
    let dir = fixture();
    let root = dir.path();
    generate(options(root).with_only(vec!["md".into()])).unwrap();

    let out = root.join("src/lib");
    assert!(out.join("md/index.ts").exists());
    assert!(!out.join("io").exists());
    assert!(!out.join("hi").exists());
}

#[test]
fn custom_output_dir() {
    let dir = fixture();
    let root = dir.path();
    let out = root.join("dist");
    generate(options(root).with_output_dir(out.clone())).unwrap();
    assert!(out.join("io/IoBell.svelte").exists());
}

#[test]
fn malformed_icon_aborts_the_run() {
    let dir = fixture();
    let root = dir.path();
    write(root, "node_modules/ionicons/svg/broken.svg", "<svg><path></svg>");

    let err = generate(options(root)).err().unwrap();
    assert!(format!("{err:#}").contains("broken.svg"));
}

#[test]
fn missing_sources_generate_empty_collections() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(root, "icons.toml", CATALOG);

    let summary = generate(options(root)).unwrap();
    assert_eq!(summary.generated(), 0);
    assert_eq!(read(root, "io/index.ts"), "// THIS FILE IS AUTO GENERATED\n");
}
