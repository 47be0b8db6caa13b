use std::cmp::Ordering;
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Source column holding the primary group id (institution).
pub const PRIMARY_COLUMN: &str = "UniversityID";
/// Source column holding the secondary group id (class code).
pub const SECONDARY_COLUMN: &str = "ClassCode";

/// Text of the "no filtering on this dimension" sentinel.
pub const ALL_LABEL: &str = "All";

// ---------------------------------------------------------------------------
// Measure – the six averaged survey metrics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Measure {
    Pace,
    Support,
    ConceptMastery,
    InstructorEngagement,
    InstructorClarity,
    InstructorKnowledge,
}

impl Measure {
    pub const COUNT: usize = 6;

    /// Every measure, in column order.
    pub const ALL: [Measure; Measure::COUNT] = [
        Measure::Pace,
        Measure::Support,
        Measure::ConceptMastery,
        Measure::InstructorEngagement,
        Measure::InstructorClarity,
        Measure::InstructorKnowledge,
    ];

    /// Header of the source column carrying this measure.
    pub fn column(self) -> &'static str {
        match self {
            Measure::Pace => "WeekPace",
            Measure::Support => "AcademicSupport",
            Measure::ConceptMastery => "ConceptMastering",
            Measure::InstructorEngagement => "instructorEngagement",
            Measure::InstructorClarity => "instructorClarity",
            Measure::InstructorKnowledge => "instructorknowledgeable",
        }
    }

    /// Human-readable name for chart axes and legends.
    pub fn label(self) -> &'static str {
        match self {
            Measure::Pace => "Pace",
            Measure::Support => "Support",
            Measure::ConceptMastery => "Concept Mastery",
            Measure::InstructorEngagement => "Instructor Engagement",
            Measure::InstructorClarity => "Instructor Clarity",
            Measure::InstructorKnowledge => "Instructor Knowledge",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

// ---------------------------------------------------------------------------
// GroupId – a primary or secondary grouping key
// ---------------------------------------------------------------------------

/// A grouping key cell. Integer ids order numerically and sort before text
/// ids, so `2 < 10 < "A"`. Serializes as the bare number or string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum GroupId {
    Integer(i64),
    Text(String),
}

impl GroupId {
    /// Interpret a raw cell. Blank cells carry no id.
    ///
    /// Only the canonical spelling of an integer becomes [`GroupId::Integer`];
    /// codes such as `007` or `+7` stay text so they never share a group
    /// with `7`.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        Some(match raw.parse::<i64>() {
            Ok(i) if i.to_string() == raw => GroupId::Integer(i),
            _ => GroupId::Text(raw.to_string()),
        })
    }
}

impl PartialOrd for GroupId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GroupId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (GroupId::Integer(a), GroupId::Integer(b)) => a.cmp(b),
            (GroupId::Text(a), GroupId::Text(b)) => a.cmp(b),
            (GroupId::Integer(_), GroupId::Text(_)) => Ordering::Less,
            (GroupId::Text(_), GroupId::Integer(_)) => Ordering::Greater,
        }
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupId::Integer(i) => write!(f, "{i}"),
            GroupId::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for GroupId {
    fn from(s: &str) -> Self {
        GroupId::Text(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// Record – one row of the raw survey dataset
// ---------------------------------------------------------------------------

/// One survey response. Measures the respondent left blank are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub primary: GroupId,
    pub secondary: GroupId,
    pub measures: [Option<f64>; Measure::COUNT],
}

impl Record {
    pub fn key(&self) -> GroupKey {
        GroupKey {
            primary: self.primary.clone(),
            secondary: self.secondary.clone(),
        }
    }

    pub fn measure(&self, measure: Measure) -> Option<f64> {
        self.measures[measure.index()]
    }
}

// ---------------------------------------------------------------------------
// AggregateRow – one averaged row per (primary, secondary)
// ---------------------------------------------------------------------------

/// Composite grouping key. Field order gives the primary-then-secondary sort.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKey {
    pub primary: GroupId,
    pub secondary: GroupId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRow {
    pub key: GroupKey,
    /// Mean per measure, indexed by [`Measure::index`].
    pub means: [f64; Measure::COUNT],
    /// Number of raw records folded into this row.
    pub records: usize,
}

impl AggregateRow {
    pub fn primary(&self) -> &GroupId {
        &self.key.primary
    }

    pub fn secondary(&self) -> &GroupId {
        &self.key.secondary
    }

    pub fn mean(&self, measure: Measure) -> f64 {
        self.means[measure.index()]
    }
}

/// Records-oriented shape: `{"UniversityID": .., "ClassCode": .., "WeekPace": .., ...}`.
impl Serialize for AggregateRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2 + Measure::COUNT))?;
        map.serialize_entry(PRIMARY_COLUMN, &self.key.primary)?;
        map.serialize_entry(SECONDARY_COLUMN, &self.key.secondary)?;
        for measure in Measure::ALL {
            map.serialize_entry(measure.column(), &self.mean(measure))?;
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// Selection / FilterSelection / OptionSet
// ---------------------------------------------------------------------------

/// One dropdown value: the `All` sentinel or a concrete id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Selection {
    #[default]
    All,
    Only(GroupId),
}

impl Selection {
    /// `"All"` (or a blank string) is the sentinel; anything else is an id.
    pub fn parse(raw: &str) -> Self {
        if raw.trim() == ALL_LABEL {
            return Selection::All;
        }
        GroupId::parse(raw).map_or(Selection::All, Selection::Only)
    }

    pub fn matches(&self, id: &GroupId) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(wanted) => wanted == id,
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::All => f.write_str(ALL_LABEL),
            Selection::Only(id) => write!(f, "{id}"),
        }
    }
}

impl From<GroupId> for Selection {
    fn from(id: GroupId) -> Self {
        Selection::Only(id)
    }
}

/// The two dropdown values of one interaction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterSelection {
    pub primary: Selection,
    pub secondary: Selection,
}

impl FilterSelection {
    pub fn new(primary: impl Into<Selection>, secondary: impl Into<Selection>) -> Self {
        Self {
            primary: primary.into(),
            secondary: secondary.into(),
        }
    }
}

/// Dropdown choices; the first entry is always [`Selection::All`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSet {
    choices: Vec<Selection>,
}

impl OptionSet {
    /// `ids` must already be distinct and in display order.
    pub fn new(ids: impl IntoIterator<Item = GroupId>) -> Self {
        let choices = std::iter::once(Selection::All)
            .chain(ids.into_iter().map(Selection::Only))
            .collect();
        Self { choices }
    }

    pub fn choices(&self) -> &[Selection] {
        &self.choices
    }

    /// The concrete ids, without the sentinel.
    pub fn ids(&self) -> impl Iterator<Item = &GroupId> {
        self.choices.iter().filter_map(|c| match c {
            Selection::Only(id) => Some(id),
            Selection::All => None,
        })
    }

    pub fn contains(&self, selection: &Selection) -> bool {
        self.choices.contains(selection)
    }
}

impl Default for OptionSet {
    fn default() -> Self {
        Self::new(std::iter::empty())
    }
}
