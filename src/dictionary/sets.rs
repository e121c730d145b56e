use serde::{
    Deserialize,
    Serialize,
};

/// The kanji lists the dictionary service can enumerate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum KanjiSet {
    #[default]
    Joyo,
    Jinmeiyo,
    Heisig,
    Kyouiku,
    Grade1,
    Grade2,
    Grade3,
    Grade4,
    Grade5,
    Grade6,
    /// Jōyō kanji taught after elementary school.
    Grade8,
    JlptN5,
    JlptN4,
    JlptN3,
    JlptN2,
    JlptN1,
    All,
}

impl KanjiSet {
    pub const ALL: [KanjiSet; 17] = [
        KanjiSet::Joyo,
        KanjiSet::Jinmeiyo,
        KanjiSet::Heisig,
        KanjiSet::Kyouiku,
        KanjiSet::Grade1,
        KanjiSet::Grade2,
        KanjiSet::Grade3,
        KanjiSet::Grade4,
        KanjiSet::Grade5,
        KanjiSet::Grade6,
        KanjiSet::Grade8,
        KanjiSet::JlptN5,
        KanjiSet::JlptN4,
        KanjiSet::JlptN3,
        KanjiSet::JlptN2,
        KanjiSet::JlptN1,
        KanjiSet::All,
    ];

    pub fn endpoint(&self) -> &'static str {
        match self {
            KanjiSet::Joyo => "joyo",
            KanjiSet::Jinmeiyo => "jinmeiyo",
            KanjiSet::Heisig => "heisig",
            KanjiSet::Kyouiku => "kyouiku",
            KanjiSet::Grade1 => "grade-1",
            KanjiSet::Grade2 => "grade-2",
            KanjiSet::Grade3 => "grade-3",
            KanjiSet::Grade4 => "grade-4",
            KanjiSet::Grade5 => "grade-5",
            KanjiSet::Grade6 => "grade-6",
            KanjiSet::Grade8 => "grade-8",
            KanjiSet::JlptN5 => "jlpt-5",
            KanjiSet::JlptN4 => "jlpt-4",
            KanjiSet::JlptN3 => "jlpt-3",
            KanjiSet::JlptN2 => "jlpt-2",
            KanjiSet::JlptN1 => "jlpt-1",
            KanjiSet::All => "all",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            KanjiSet::Joyo => "Jōyō (Standard)",
            KanjiSet::Jinmeiyo => "Jinmeiyō (Names)",
            KanjiSet::Heisig => "Heisig (Keywords)",
            KanjiSet::Kyouiku => "Kyōiku (School)",
            KanjiSet::Grade1 => "Grade 1",
            KanjiSet::Grade2 => "Grade 2",
            KanjiSet::Grade3 => "Grade 3",
            KanjiSet::Grade4 => "Grade 4",
            KanjiSet::Grade5 => "Grade 5",
            KanjiSet::Grade6 => "Grade 6",
            KanjiSet::Grade8 => "Jōyō (excluding Kyōiku)",
            KanjiSet::JlptN5 => "JLPT N5",
            KanjiSet::JlptN4 => "JLPT N4",
            KanjiSet::JlptN3 => "JLPT N3",
            KanjiSet::JlptN2 => "JLPT N2",
            KanjiSet::JlptN1 => "JLPT N1",
            KanjiSet::All => "All Kanji (13k+)",
        }
    }

    pub fn from_endpoint(endpoint: &str) -> Option<KanjiSet> {
        Self::ALL.iter().copied().find(|set| set.endpoint() == endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_round_trip() {
        for set in KanjiSet::ALL {
            assert_eq!(KanjiSet::from_endpoint(set.endpoint()), Some(set));
        }
        assert_eq!(KanjiSet::from_endpoint("grade-7"), None);
    }

    #[test]
    fn test_serde_uses_kebab_case() {
        assert_eq!(serde_json::to_string(&KanjiSet::JlptN5).unwrap(), "\"jlpt-n5\"");
        let set: KanjiSet = serde_json::from_str("\"grade8\"").unwrap();
        assert_eq!(set, KanjiSet::Grade8);
    }
}
