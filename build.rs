#[cfg(feature = "regen-tests")]
fn main() -> anyhow::Result<()> {
    use anyhow::Context;
    use std::fs::{read_dir, File};
    use std::io::{BufWriter, Write};

    println!("cargo::rerun-if-changed=tests/samples");

    let mut names = vec![];
    for entry in read_dir("tests/samples")? {
        let path = entry?.path();
        let name = path.file_name().context("no filename")?.to_str().context("invalid filename")?;
        names.push(name.to_owned());
    }
    names.sort_unstable();

    let mut test_suite = BufWriter::new(File::create("tests/main.rs")?);
    write!(test_suite, "//! Auto-generated from build.rs\n\nmod common;\nuse common::cmp;\n")?;
    for name in names {
        write!(test_suite, "\n#[test]\nfn {name}() {{\n    cmp(\"tests/samples/{name}\")\n}}\n")?;
    }
    Ok(())
}

#[cfg(not(feature = "regen-tests"))]
fn main() {}
