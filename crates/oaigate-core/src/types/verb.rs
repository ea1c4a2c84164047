//! OAI-PMH verb type.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, InvalidInputError};

/// One of the six OAI-PMH requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Verb {
    Identify,
    ListMetadataFormats,
    ListSets,
    ListIdentifiers,
    ListRecords,
    GetRecord,
}

impl Verb {
    /// Returns the verb name as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Identify => "Identify",
            Verb::ListMetadataFormats => "ListMetadataFormats",
            Verb::ListSets => "ListSets",
            Verb::ListIdentifiers => "ListIdentifiers",
            Verb::ListRecords => "ListRecords",
            Verb::GetRecord => "GetRecord",
        }
    }

    /// Returns true for the verbs that page through results with resumption tokens.
    pub fn is_list(&self) -> bool {
        matches!(self, Verb::ListIdentifiers | Verb::ListRecords)
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verb {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Identify" => Ok(Verb::Identify),
            "ListMetadataFormats" => Ok(Verb::ListMetadataFormats),
            "ListSets" => Ok(Verb::ListSets),
            "ListIdentifiers" => Ok(Verb::ListIdentifiers),
            "ListRecords" => Ok(Verb::ListRecords),
            "GetRecord" => Ok(Verb::GetRecord),
            other => Err(InvalidInputError::Other {
                message: format!("unknown verb '{}'", other),
            }
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_wire_names() {
        for verb in [
            Verb::Identify,
            Verb::ListMetadataFormats,
            Verb::ListSets,
            Verb::ListIdentifiers,
            Verb::ListRecords,
            Verb::GetRecord,
        ] {
            assert_eq!(verb.as_str().parse::<Verb>().unwrap(), verb);
        }
    }

    #[test]
    fn unknown_verb() {
        assert!("ListEverything".parse::<Verb>().is_err());
    }

    #[test]
    fn list_verbs() {
        assert!(Verb::ListRecords.is_list());
        assert!(Verb::ListIdentifiers.is_list());
        assert!(!Verb::GetRecord.is_list());
    }
}
