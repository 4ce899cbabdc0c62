use std::fmt::Display;

/// Metadata fields of a track, each backed by one ID3v2 frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TrackField {
    Title,
    Performer,
    Band,
    Album,
    Year,
    Genre,
    Comment,
    TrackNumber,
}

impl TrackField {
    pub const ALL: [TrackField; 8] = [
        TrackField::Title,
        TrackField::Performer,
        TrackField::Band,
        TrackField::Album,
        TrackField::Year,
        TrackField::Genre,
        TrackField::Comment,
        TrackField::TrackNumber,
    ];

    /// Free-text fields that get word-case formatting after a rename
    pub const WORD_CASED: [TrackField; 5] = [
        TrackField::Title,
        TrackField::Performer,
        TrackField::Band,
        TrackField::Album,
        TrackField::Genre,
    ];

    pub fn tag_id(self) -> &'static str {
        match self {
            TrackField::Title => "TIT2",
            TrackField::Performer => "TPE1",
            TrackField::Band => "TPE2",
            TrackField::Album => "TALB",
            TrackField::Year => "TYER",
            TrackField::Genre => "TCON",
            TrackField::Comment => "COMM",
            TrackField::TrackNumber => "TRCK",
        }
    }

    pub fn from_tag_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.tag_id() == id)
    }
}

impl Display for TrackField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag_id())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordField {
    Artist,
    Title,
    Year,
    Genre,
}

/// Which track field feeds which record field, in resolution order.
///
/// Band and performer both feed the artist, which makes artist a duplicate field.
pub const TRACK_TO_RECORD: [(TrackField, RecordField); 5] = [
    (TrackField::Band, RecordField::Artist),
    (TrackField::Performer, RecordField::Artist),
    (TrackField::Album, RecordField::Title),
    (TrackField::Year, RecordField::Year),
    (TrackField::Genre, RecordField::Genre),
];

impl RecordField {
    /// A record field fed by more than one track field
    pub fn is_duplicate(self) -> bool {
        TRACK_TO_RECORD
            .iter()
            .filter(|(_, record)| *record == self)
            .count()
            > 1
    }
}
