//! File type classification: content sniffing first, extension table second.

use super::types::FileType;
use std::io;
use std::path::Path;

/// Source of MIME types derived from file content.
///
/// `Ok(None)` means the content carried no recognisable signature; the classifier then falls
/// back to the extension table, exactly as it does on `Err`.
pub trait ContentSniffer: Send + Sync {
    /// Inspect the file at `path` and report its MIME type, if recognisable.
    fn sniff(&self, path: &Path) -> io::Result<Option<String>>;
}

/// Sniffs magic-byte signatures with the `infer` crate.
///
/// Signature-less content such as plain text or CSV yields no MIME type.
#[derive(Debug, Default, Clone, Copy)]
pub struct MagicSniffer;

impl ContentSniffer for MagicSniffer {
    fn sniff(&self, path: &Path) -> io::Result<Option<String>> {
        Ok(infer::get_from_path(path)?.map(|kind| kind.mime_type().to_string()))
    }
}

/// Disables sniffing so that only extensions are consulted.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSniffer;

impl ContentSniffer for NoSniffer {
    fn sniff(&self, _path: &Path) -> io::Result<Option<String>> {
        Ok(None)
    }
}

impl FileType {
    /// Map a MIME type by substring, checked in order: pdf, text, excel/spreadsheet, csv.
    pub fn from_mime(mime: &str) -> Self {
        if mime.contains("pdf") {
            Self::Pdf
        } else if mime.contains("text") {
            Self::Text
        } else if mime.contains("excel") || mime.contains("spreadsheet") {
            Self::Excel
        } else if mime.contains("csv") {
            Self::Csv
        } else {
            Self::Unknown
        }
    }

    /// Map a path by its (case-insensitive) extension.
    pub fn from_extension(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "txt" | "md" | "log" => Self::Text,
            "xlsx" | "xls" => Self::Excel,
            "csv" => Self::Csv,
            "pdf" => Self::Pdf,
            _ => Self::Unknown,
        }
    }
}

/// Classify the file at `path`.
///
/// Paths that are not regular files are `Unknown`. A sniffed MIME type always wins over the
/// extension, even when it maps to `Unknown`.
pub fn classify(path: &Path, sniffer: &dyn ContentSniffer) -> FileType {
    if !path.is_file() {
        tracing::error!(path = %path.display(), "File does not exist");
        return FileType::Unknown;
    }

    match sniffer.sniff(path) {
        Ok(Some(mime)) => {
            tracing::info!(path = %path.display(), mime = %mime, "MIME type detected");
            return FileType::from_mime(&mime);
        }
        Ok(None) => {}
        Err(error) => {
            tracing::warn!(path = %path.display(), error = %error, "Content sniffing failed");
        }
    }

    let file_type = FileType::from_extension(path);
    tracing::info!(
        path = %path.display(),
        file_type = %file_type,
        "Falling back to extension detection"
    );
    file_type
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    struct FixedSniffer(Option<&'static str>);

    impl ContentSniffer for FixedSniffer {
        fn sniff(&self, _path: &Path) -> io::Result<Option<String>> {
            Ok(self.0.map(str::to_string))
        }
    }

    struct BrokenSniffer;

    impl ContentSniffer for BrokenSniffer {
        fn sniff(&self, _path: &Path) -> io::Result<Option<String>> {
            Err(io::Error::other("magic database missing"))
        }
    }

    fn temp_with_suffix(suffix: &str, contents: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(suffix)
            .tempfile()
            .expect("temp file");
        file.write_all(contents).expect("write");
        file
    }

    #[test]
    fn extension_table_without_sniffing() {
        let cases = [
            (".txt", FileType::Text),
            (".md", FileType::Text),
            (".log", FileType::Text),
            (".xlsx", FileType::Excel),
            (".xls", FileType::Excel),
            (".csv", FileType::Csv),
            (".pdf", FileType::Pdf),
            (".CSV", FileType::Csv),
            (".unknownext", FileType::Unknown),
        ];
        for (suffix, expected) in cases {
            let file = temp_with_suffix(suffix, b"a,b\n");
            assert_eq!(classify(file.path(), &NoSniffer), expected, "suffix {suffix}");
        }
    }

    #[test]
    fn missing_path_is_unknown() {
        assert_eq!(
            classify(Path::new("/no/such/file.pdf"), &NoSniffer),
            FileType::Unknown
        );
    }

    #[test]
    fn sniffed_type_takes_precedence() {
        let file = temp_with_suffix(".csv", b"1,2\n");
        assert_eq!(
            classify(file.path(), &FixedSniffer(Some("application/pdf"))),
            FileType::Pdf
        );
        assert_eq!(
            classify(file.path(), &FixedSniffer(Some("image/png"))),
            FileType::Unknown
        );
    }

    #[test]
    fn sniffer_errors_fall_back_to_extension() {
        let file = temp_with_suffix(".md", b"# heading");
        assert_eq!(classify(file.path(), &BrokenSniffer), FileType::Text);
    }

    #[test]
    fn mime_substrings_map_in_order() {
        assert_eq!(FileType::from_mime("text/csv"), FileType::Text);
        assert_eq!(
            FileType::from_mime("application/vnd.ms-excel"),
            FileType::Excel
        );
        assert_eq!(
            FileType::from_mime("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
            FileType::Excel
        );
        assert_eq!(FileType::from_mime("application/csv"), FileType::Csv);
        assert_eq!(FileType::from_mime("application/zip"), FileType::Unknown);
    }

    #[test]
    fn magic_sniffer_detects_pdf_signature_and_skips_plain_text() {
        let pdf = temp_with_suffix(".txt", b"%PDF-1.7\n%\xE2\xE3\xCF\xD3\n");
        assert_eq!(classify(pdf.path(), &MagicSniffer), FileType::Pdf);

        let csv = temp_with_suffix(".csv", b"1,alice\n2,bob\n");
        assert_eq!(classify(csv.path(), &MagicSniffer), FileType::Csv);
    }
}
