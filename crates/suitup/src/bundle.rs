//! Aggregate `all.*` build files.
//!
//! Each template directory gets `all.<dir>.js` and `all.<dir>.css` holding
//! its units; `all.js` and `all.css` hold every unit. Inputs are read back
//! from the output directories in sorted order.

use crate::files::output_dir;
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::BTreeSet;
use std::fs;
use std::io;
use tracing::debug;

/// Artifact kinds that are bundled.
const BUNDLED: [&str; 2] = ["js", "css"];

/// Writes the bundles for the dotted template `directories`.
pub fn build(root: &Utf8Path, directories: &BTreeSet<String>) -> io::Result<Vec<Utf8PathBuf>> {
    let mut written = Vec::new();

    for artifact in BUNDLED {
        let dir = output_dir(root, artifact);
        let units = unit_files(&dir, artifact)?;

        for directory in directories {
            let prefix = format!("{}_", directory.replace('.', "_"));
            let members: Vec<&String> = units
                .iter()
                .filter(|file| file.starts_with(&prefix))
                .collect();
            let path = dir.join(format!("all.{directory}.{artifact}"));
            write_bundle(&dir, &path, members)?;
            written.push(path);
        }

        let path = dir.join(format!("all.{artifact}"));
        write_bundle(&dir, &path, units.iter())?;
        written.push(path);
    }

    debug!(bundles = written.len(), "wrote bundles");
    Ok(written)
}

/// Sorted unit file names in `dir`, excluding earlier bundles.
fn unit_files(dir: &Utf8Path, artifact: &str) -> io::Result<Vec<String>> {
    let suffix = format!(".{artifact}");
    let mut files = Vec::new();
    for entry in dir.read_dir_utf8()? {
        let entry = entry?;
        let name = entry.file_name();
        if entry.file_type()?.is_file() && name.ends_with(&suffix) && !name.starts_with("all.") {
            files.push(name.to_string());
        }
    }
    files.sort();
    Ok(files)
}

fn write_bundle<'a>(
    dir: &Utf8Path,
    path: &Utf8Path,
    members: impl IntoIterator<Item = &'a String>,
) -> io::Result<()> {
    let mut out = String::new();
    for member in members {
        let text = fs::read_to_string(dir.join(member))?;
        out.push_str(&text);
        if !text.is_empty() && !text.ends_with('\n') {
            out.push('\n');
        }
    }
    fs::write(path, out)
}
