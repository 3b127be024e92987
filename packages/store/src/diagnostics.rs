//! # Diagnostics — degraded conditions that are not errors
//!
//! Several situations are absorbed by the store rather than returned to the
//! caller: an index blob that no longer decodes, an entry that no longer
//! decodes, an indexed key with no entry behind it, an entry left behind by a
//! failed cleanup. Each is logged with `tracing::warn!` and, when a
//! [`DiagnosticSink`] is installed, also handed to the embedding application
//! as a [`Diagnostic`] so it can count or display them (for example in an
//! activity log).

use std::fmt;
use std::sync::Arc;

/// A warning-class condition observed by an [`Indexer`](crate::Indexer).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Diagnostic {
    /// The persisted index failed to decode during `init`; the namespace
    /// started from an empty index.
    CorruptIndex { namespace: String, error: String },
    /// An entry failed to decode and was read as absent.
    CorruptEntry {
        namespace: String,
        key: String,
        error: String,
    },
    /// A key listed in the index had no entry in the backend.
    MissingEntry { namespace: String, key: String },
    /// `clear` emptied the index but could not remove this entry.
    OrphanedEntry {
        namespace: String,
        key: String,
        error: String,
    },
}

impl Diagnostic {
    pub fn namespace(&self) -> &str {
        match self {
            Diagnostic::CorruptIndex { namespace, .. }
            | Diagnostic::CorruptEntry { namespace, .. }
            | Diagnostic::MissingEntry { namespace, .. }
            | Diagnostic::OrphanedEntry { namespace, .. } => namespace,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::CorruptIndex { namespace, error } => {
                write!(f, "index of `{namespace}` is corrupt, starting empty: {error}")
            }
            Diagnostic::CorruptEntry {
                namespace,
                key,
                error,
            } => write!(f, "entry `{key}` in `{namespace}` is corrupt: {error}"),
            Diagnostic::MissingEntry { namespace, key } => {
                write!(f, "indexed key `{key}` in `{namespace}` has no entry")
            }
            Diagnostic::OrphanedEntry {
                namespace,
                key,
                error,
            } => write!(f, "entry `{key}` in `{namespace}` left orphaned: {error}"),
        }
    }
}

/// Callback receiving every [`Diagnostic`].
pub type DiagnosticSink = Arc<dyn Fn(&Diagnostic) + Send + Sync>;

#[derive(Clone, Default)]
pub(crate) struct Diagnostics {
    sink: Option<DiagnosticSink>,
}

impl Diagnostics {
    pub(crate) fn set_sink(&mut self, sink: DiagnosticSink) {
        self.sink = Some(sink);
    }

    pub(crate) fn emit(&self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::CorruptIndex { namespace, error } => {
                tracing::warn!(%namespace, %error, "index failed to decode, starting empty");
            }
            Diagnostic::CorruptEntry {
                namespace,
                key,
                error,
            } => {
                tracing::warn!(%namespace, %key, %error, "entry failed to decode, treating as absent");
            }
            Diagnostic::MissingEntry { namespace, key } => {
                tracing::warn!(%namespace, %key, "indexed key has no entry, skipping");
            }
            Diagnostic::OrphanedEntry {
                namespace,
                key,
                error,
            } => {
                tracing::warn!(%namespace, %key, %error, "entry removal failed after index was cleared");
            }
        }
        if let Some(sink) = &self.sink {
            sink(&diagnostic);
        }
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics")
            .field("sink", &self.sink.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_emit_reaches_sink() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut diagnostics = Diagnostics::default();
        let sink_seen = seen.clone();
        diagnostics.set_sink(Arc::new(move |d: &Diagnostic| {
            sink_seen.lock().unwrap().push(d.clone())
        }));

        diagnostics.emit(Diagnostic::MissingEntry {
            namespace: "notes".to_string(),
            key: "a".to_string(),
        });

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].namespace(), "notes");
        assert_eq!(seen[0].to_string(), "indexed key `a` in `notes` has no entry");
    }

    #[test]
    fn test_emit_without_sink_is_quiet() {
        Diagnostics::default().emit(Diagnostic::CorruptIndex {
            namespace: "notes".to_string(),
            error: "eof".to_string(),
        });
    }
}
