//! Identifiers for quotation entities
//!
//! All identifiers are time-ordered UUIDs (v7). Each type displays with a
//! short prefix and parses with or without it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident => $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new_v7() -> Self {
                Self(Uuid::now_v7())
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "-{}"), self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let bare = s.strip_prefix(concat!($prefix, "-")).unwrap_or(s);
                Uuid::parse_str(bare).map(Self)
            }
        }
    };
}

identifier! {
    /// One in-progress quotation, from flow start to confirmation or cancel
    QuotationId => "QUO"
}

identifier! {
    /// One attempt to hand a finished quotation to the transport adapter
    SubmissionId => "SUB"
}

identifier! {
    /// A document record on a draft; replaced when the type is re-uploaded
    DocumentId => "DOC"
}

identifier! {
    /// One upload of a document. Extraction results are matched back to the
    /// draft by this id, so a result for a superseded upload is dropped.
    UploadId => "UPL"
}
