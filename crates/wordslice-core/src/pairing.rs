//! Pairing document images with their annotation files.
//!
//! Every page image must have exactly one annotation file sharing its
//! filename stem, and vice versa. Pairing is validated up front: a mismatch
//! is a batch-level consistency failure, raised before any extraction runs.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::error::PairingError;

/// One matched (image, annotation) pair, keyed by the shared filename stem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPair {
    pub key: String,
    pub image_path: PathBuf,
    pub annotation_path: PathBuf,
}

/// Pair image and annotation files by filename stem.
///
/// Returns pairs sorted by key. Fails if the counts differ or if any stem
/// on one side has no counterpart on the other.
pub fn pair_by_stem(
    images: &[PathBuf],
    annotations: &[PathBuf],
) -> Result<Vec<DocumentPair>, PairingError> {
    if images.len() != annotations.len() {
        return Err(PairingError::CountMismatch {
            images: images.len(),
            annotations: annotations.len(),
        });
    }

    let annotation_stems: BTreeMap<String, &PathBuf> = annotations
        .iter()
        .map(|path| (stem_of(path), path))
        .collect();

    let mut pairs = Vec::with_capacity(images.len());
    for image in images {
        let key = stem_of(image);
        let annotation = annotation_stems
            .get(&key)
            .ok_or_else(|| PairingError::MissingAnnotation { stem: key.clone() })?;
        pairs.push(DocumentPair {
            key,
            image_path: image.clone(),
            annotation_path: (*annotation).clone(),
        });
    }

    // Duplicate stems on the image side can leave an annotation unmatched
    // even when the counts agree.
    let paired: BTreeSet<&str> = pairs.iter().map(|p| p.key.as_str()).collect();
    for stem in annotation_stems.keys() {
        if !paired.contains(stem.as_str()) {
            return Err(PairingError::MissingDocument { stem: stem.clone() });
        }
    }

    pairs.sort_by(|a, b| a.key.cmp(&b.key));
    Ok(pairs)
}

fn stem_of(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn pairs_by_stem_sorted() {
        let images = paths(&["pages/271.jpg", "pages/270.jpg"]);
        let annotations = paths(&["locations/270.svg", "locations/271.svg"]);

        let pairs = pair_by_stem(&images, &annotations).unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].key, "270");
        assert_eq!(pairs[0].image_path, PathBuf::from("pages/270.jpg"));
        assert_eq!(pairs[0].annotation_path, PathBuf::from("locations/270.svg"));
        assert_eq!(pairs[1].key, "271");
    }

    #[test]
    fn count_mismatch_is_fatal() {
        let images = paths(&["a.jpg", "b.jpg"]);
        let annotations = paths(&["a.svg"]);

        let err = pair_by_stem(&images, &annotations).unwrap_err();
        assert!(matches!(
            err,
            PairingError::CountMismatch {
                images: 2,
                annotations: 1
            }
        ));
    }

    #[test]
    fn duplicate_image_stems_leave_annotation_unmatched() {
        let images = paths(&["a/270.jpg", "b/270.jpg"]);
        let annotations = paths(&["270.svg", "271.svg"]);

        let err = pair_by_stem(&images, &annotations).unwrap_err();
        assert!(matches!(err, PairingError::MissingDocument { stem } if stem == "271"));
    }

    #[test]
    fn unmatched_stem_is_fatal() {
        let images = paths(&["a.jpg", "b.jpg"]);
        let annotations = paths(&["a.svg", "c.svg"]);

        let err = pair_by_stem(&images, &annotations).unwrap_err();
        assert!(matches!(err, PairingError::MissingAnnotation { stem } if stem == "b"));
    }
}
