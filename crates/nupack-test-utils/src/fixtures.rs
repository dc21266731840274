//! In-memory zip fixtures.

use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;

/// Build a zip archive with the given entries.
#[must_use]
pub fn zip_with_entries(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = zip::ZipWriter::new(&mut cursor);
        for (name, contents) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .expect("fixture entry");
            writer.write_all(contents).expect("fixture contents");
        }
        writer.finish().expect("fixture archive");
    }
    cursor.into_inner()
}

/// Build a plausible package archive for an identity.
#[must_use]
pub fn package_zip(name: &str, version: &str) -> Vec<u8> {
    let nuspec = format!(
        "<package><metadata><id>{name}</id><version>{version}</version></metadata></package>"
    );
    let lib_entry = format!("lib/any/{name}.txt");
    zip_with_entries(&[
        (&format!("{name}.nuspec"), nuspec.as_bytes()),
        (&lib_entry, b"fixture payload"),
    ])
}
