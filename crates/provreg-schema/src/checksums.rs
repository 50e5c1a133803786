//! Parsing for `SHA256SUMS` checksum lists.

use crate::Sha256Digest;

/// Entries of a `sha256sum`-style checksum list.
///
/// Each non-empty line is `<hex digest> <filename>`, separated by
/// whitespace, with an optional `*` binary-mode marker before the filename.
/// Lines that do not parse are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChecksumList {
    entries: Vec<(Sha256Digest, String)>,
}

impl ChecksumList {
    /// Parse the text of a checksum list.
    pub fn parse(text: &str) -> Self {
        let entries = text
            .lines()
            .filter_map(|line| {
                let mut parts = line.split_whitespace();
                let digest = Sha256Digest::new(parts.next()?).ok()?;
                let filename = parts.next()?.trim_start_matches('*');
                if filename.is_empty() {
                    return None;
                }
                Some((digest, filename.to_string()))
            })
            .collect();
        Self { entries }
    }

    /// Digest listed for `filename`, if any.
    pub fn digest_for(&self, filename: &str) -> Option<&Sha256Digest> {
        self.entries
            .iter()
            .find(|(_, name)| name == filename)
            .map(|(digest, _)| digest)
    }

    /// Number of parsed entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entry parsed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";
    const B: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    #[test]
    fn finds_entry_by_filename() {
        let text = format!(
            "{A}  terraform-provider-mylocal_v1.0.0.zip\n{B} *terraform-provider-mylocal_v1.0.0_manifest.json\n"
        );
        let list = ChecksumList::parse(&text);
        assert_eq!(list.len(), 2);
        assert_eq!(
            list.digest_for("terraform-provider-mylocal_v1.0.0.zip").map(Sha256Digest::as_str),
            Some(A)
        );
        assert_eq!(
            list.digest_for("terraform-provider-mylocal_v1.0.0_manifest.json")
                .map(Sha256Digest::as_str),
            Some(B)
        );
        assert!(list.digest_for("other.zip").is_none());
    }

    #[test]
    fn skips_garbage_lines() {
        let text = format!("\n# comment\nnot-a-digest file.zip\n{A}\n{A} ok.zip\n");
        let list = ChecksumList::parse(&text);
        assert_eq!(list.len(), 1);
        assert!(list.digest_for("ok.zip").is_some());
    }
}
