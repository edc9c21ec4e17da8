//! The `.apkg` container: a zip holding the collection image and the media
//! manifest.

use std::{
    fs,
    io::Write,
    path::Path,
};

use anyhow::{Context, Result};
use tempfile::NamedTempFile;
use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

pub const COLLECTION_ENTRY: &str = "collection.anki2";
pub const MEDIA_ENTRY: &str = "media";

/// Packages never ship media, so the manifest is always empty.
const EMPTY_MEDIA_MANIFEST: &[u8] = b"{}";

fn entry_options() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
}

/// Write the archive to `output`, replacing whatever is there.
///
/// The zip is assembled in a temporary file next to `output` and renamed into
/// place only once it is complete.
pub fn write_archive(output: &Path, collection: &[u8]) -> Result<()> {
    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;

    let staged = NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temporary file in {}", dir.display()))?;

    {
        let mut zip = ZipWriter::new(staged.as_file());
        zip.start_file(COLLECTION_ENTRY, entry_options())
            .context("failed to start collection entry")?;
        zip.write_all(collection)
            .context("failed to write collection entry")?;
        zip.start_file(MEDIA_ENTRY, entry_options())
            .context("failed to start media entry")?;
        zip.write_all(EMPTY_MEDIA_MANIFEST)
            .context("failed to write media entry")?;
        zip.finish().context("failed to finish archive")?;
    }

    staged
        .as_file()
        .sync_all()
        .context("failed to flush archive")?;
    staged
        .persist(output)
        .map_err(|err| err.error)
        .with_context(|| format!("failed to move archive into place at {}", output.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;

    #[test]
    fn archive_holds_collection_and_empty_media() {
        let dir = tempfile::tempdir().expect("tempdir");
        let out = dir.path().join("nested/deck.apkg");
        fs::create_dir_all(out.parent().expect("parent")).expect("mkdir");
        fs::write(&out, b"stale").expect("seed stale file");

        write_archive(&out, b"sqlite bytes").expect("write archive");

        let mut archive = zip::ZipArchive::new(fs::File::open(&out).expect("open")).expect("zip");
        assert_eq!(archive.len(), 2);

        let mut collection = Vec::new();
        archive
            .by_name(COLLECTION_ENTRY)
            .expect("collection entry")
            .read_to_end(&mut collection)
            .expect("read");
        assert_eq!(collection, b"sqlite bytes");

        let mut media = String::new();
        archive
            .by_name(MEDIA_ENTRY)
            .expect("media entry")
            .read_to_string(&mut media)
            .expect("read");
        assert_eq!(media, "{}");
    }

    #[test]
    fn failed_write_leaves_no_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        // A directory where the file should go makes the final rename fail.
        let out = dir.path().join("taken");
        fs::create_dir_all(out.join("child")).expect("mkdir");

        assert!(write_archive(&out, b"x").is_err());
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .expect("list")
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name() != "taken")
            .collect();
        assert!(leftovers.is_empty());
    }
}
