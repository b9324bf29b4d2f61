//! Corpus-wide reports: error type tally and consistency checks.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use ua_gec_engine::io::CorpusDocument;

/// Metadata key holding the error category of an annotation.
pub const ERROR_TYPE: &str = "error_type";
/// Tally bucket for annotations without an error type.
pub const MISSING: &str = "<missing>";

/// Number of annotations per error type.
#[derive(Debug, Default, PartialEq)]
pub struct ErrorTally {
    counts: BTreeMap<String, usize>,
}

impl ErrorTally {
    pub fn from_documents(documents: &[CorpusDocument]) -> Self {
        let mut tally = Self::default();
        for doc in documents {
            for ann in doc.annotated.annotations() {
                let error_type = match ann.meta().get(ERROR_TYPE) {
                    Some(error_type) => error_type,
                    None => {
                        log::warn!("{} in {} has no {ERROR_TYPE}", ann, doc.path);
                        MISSING
                    }
                };
                *tally.counts.entry(error_type.to_string()).or_default() += 1;
            }
        }
        tally
    }

    pub fn get(&self, error_type: &str) -> usize {
        self.counts.get(error_type).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}

impl fmt::Display for ErrorTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (error_type, count) in &self.counts {
            writeln!(f, "{error_type:<30} {count}")?;
        }
        write!(f, "{:<30} {}", "TOTAL", self.total())
    }
}

/// A consistency problem found in the corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    NoAnnotations {
        doc_id: String,
        annotator_id: u32,
    },
    MissingErrorType {
        doc_id: String,
        annotation: String,
    },
    /// The second annotator's source text differs from the first one's.
    SourceMismatch { doc_id: String },
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Issue::NoAnnotations {
                doc_id,
                annotator_id,
            } => write!(f, "Annotations missing in {doc_id} (annotator {annotator_id})"),
            Issue::MissingErrorType { doc_id, annotation } => {
                write!(f, "Missing {ERROR_TYPE} in {doc_id}: {annotation}")
            }
            Issue::SourceMismatch { doc_id } => {
                write!(f, "Source of {doc_id} differs between annotators")
            }
        }
    }
}

pub fn validate(documents: &[CorpusDocument]) -> Vec<Issue> {
    let mut issues = Vec::new();

    for doc in documents {
        let annotations = doc.annotated.annotations();
        if annotations.is_empty() {
            issues.push(Issue::NoAnnotations {
                doc_id: doc.name.doc_id.clone(),
                annotator_id: doc.name.annotator_id,
            });
        }
        for ann in annotations {
            if !ann.meta().contains_key(ERROR_TYPE) {
                issues.push(Issue::MissingErrorType {
                    doc_id: doc.name.doc_id.clone(),
                    annotation: ann.to_string(),
                });
            }
        }
    }

    let by_name: HashMap<(&str, u32), &CorpusDocument> = documents
        .iter()
        .map(|doc| ((doc.name.doc_id.as_str(), doc.name.annotator_id), doc))
        .collect();
    let mut mismatched = BTreeSet::new();
    for doc in documents.iter().filter(|doc| doc.name.annotator_id == 2) {
        match by_name.get(&(doc.name.doc_id.as_str(), 1)) {
            Some(first) if first.source().trim() != doc.source().trim() => {
                mismatched.insert(doc.name.doc_id.clone());
            }
            Some(_) => {}
            None => log::warn!("{} has no first annotator version", doc.name.doc_id),
        }
    }
    issues.extend(
        mismatched
            .into_iter()
            .map(|doc_id| Issue::SourceMismatch { doc_id }),
    );

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use relative_path::RelativePath;
    use ua_gec_engine::AnnotatedText;
    use ua_gec_engine::io::DocumentName;

    fn doc(file_name: &str, markup: &str) -> CorpusDocument {
        CorpusDocument {
            name: DocumentName::parse(file_name).unwrap(),
            path: RelativePath::new(file_name).to_relative_path_buf(),
            annotated: AnnotatedText::new(markup),
        }
    }

    #[test]
    fn tally_counts_error_types() {
        let docs = vec![
            doc(
                "0001.a1.ann",
                "I {likes=>like:::error_type=Grammar} {turtle=>turtles:::error_type=Grammar}.",
            ),
            doc("0002.a1.ann", "{Helo=>Hello:::error_type=Spelling}{=>,} world"),
        ];

        let tally = ErrorTally::from_documents(&docs);
        assert_eq!(tally.get("Grammar"), 2);
        assert_eq!(tally.get("Spelling"), 1);
        assert_eq!(tally.get(MISSING), 1);
        assert_eq!(tally.get("Fluency"), 0);
        assert_eq!(tally.total(), 4);
    }

    #[test]
    fn tally_display_ends_with_total() {
        let docs = vec![doc("0001.a1.ann", "{a=>b:::error_type=Punctuation}")];
        let rendered = ErrorTally::from_documents(&docs).to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Punctuation "));
        assert!(lines[1].starts_with("TOTAL "));
        assert!(lines[1].ends_with(" 1"));
    }

    #[test]
    fn valid_corpus_has_no_issues() {
        let docs = vec![
            doc("0001.a1.ann", "{helo=>Hello:::error_type=Spelling} world"),
            doc("0001.a2.ann", "{helo=>Hello:::error_type=Spelling} world\n"),
        ];
        assert!(validate(&docs).is_empty());
    }

    #[test]
    fn reports_each_kind_of_issue() {
        let docs = vec![
            doc("0001.a1.ann", "nothing to fix"),
            doc("0002.a1.ann", "{helo=>Hello} world"),
            doc("0003.a1.ann", "{helo=>Hello:::error_type=Spelling} world"),
            doc("0003.a2.ann", "{hello=>Hello:::error_type=Spelling} world"),
        ];

        let issues = validate(&docs);
        assert_eq!(
            issues,
            vec![
                Issue::NoAnnotations {
                    doc_id: "0001".into(),
                    annotator_id: 1
                },
                Issue::MissingErrorType {
                    doc_id: "0002".into(),
                    annotation: "{helo=>Hello}".into()
                },
                Issue::SourceMismatch {
                    doc_id: "0003".into()
                },
            ]
        );
        assert_eq!(
            issues[2].to_string(),
            "Source of 0003 differs between annotators"
        );
    }
}
