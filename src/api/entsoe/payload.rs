use std::io::{Cursor, Read};

use zip::ZipArchive;

use crate::prelude::*;

/// Raw response body along with its declared content type.
#[must_use]
pub struct Payload {
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl Payload {
    #[must_use]
    pub fn is_archive(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|content_type| content_type.contains("application/zip"))
    }

    /// Unpack the documents: every file of an archive, or the body itself otherwise.
    pub fn into_documents(self) -> Result<Vec<Vec<u8>>> {
        if !self.is_archive() {
            return Ok(vec![self.body]);
        }
        let mut archive = ZipArchive::new(Cursor::new(self.body))?;
        let mut documents = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let mut file = archive.by_index(index)?;
            if file.is_dir() {
                continue;
            }
            debug!(name = file.name(), size = file.size(), "unpacking…");
            let mut document = Vec::new();
            file.read_to_end(&mut document)?;
            documents.push(document);
        }
        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

    use super::*;

    fn archive(files: &[(&str, &[u8])]) -> Result<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            || SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        writer.add_directory("nested/", options())?;
        for (name, content) in files {
            writer.start_file(*name, options())?;
            writer.write_all(content)?;
        }
        Ok(writer.finish()?.into_inner())
    }

    #[test]
    fn test_plain_document() -> Result {
        let payload = Payload { content_type: Some("text/xml".into()), body: b"<a/>".to_vec() };
        assert!(!payload.is_archive());
        assert_eq!(payload.into_documents()?, [b"<a/>".to_vec()]);
        Ok(())
    }

    #[test]
    fn test_missing_content_type() -> Result {
        let payload = Payload { content_type: None, body: b"<a/>".to_vec() };
        assert_eq!(payload.into_documents()?.len(), 1);
        Ok(())
    }

    #[test]
    fn test_archive() -> Result {
        let body = archive(&[
            ("first.xml", "<first/>".as_bytes()),
            ("nested/second.xml", "<second/>".as_bytes()),
        ])?;
        let payload = Payload { content_type: Some("application/zip".into()), body };
        assert!(payload.is_archive());
        assert_eq!(payload.into_documents()?, [b"<first/>".to_vec(), b"<second/>".to_vec()]);
        Ok(())
    }

    #[test]
    fn test_broken_archive() {
        let payload = Payload { content_type: Some("application/zip".into()), body: vec![1, 2, 3] };
        assert!(matches!(payload.into_documents(), Err(Error::Archive(_))));
    }
}
