//! Study plan generation from weak points.
//!
//! The plan is built from fixed per-domain tables: today's activities come
//! from the top weak point (or a balanced default), the week always cycles
//! through the same seven focuses, and every weak point gets a focus area.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::Domain;
use crate::statistics::WeakPoint;

/// Minutes for the primary activity on the top weak domain's day.
pub const EMPHASIS_MINUTES: u32 = 45;
/// Minutes for the primary activity on any other day.
pub const REGULAR_MINUTES: u32 = 30;
/// Minutes for the secondary vocabulary review.
pub const SECONDARY_MINUTES: u32 = 15;

const DAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

const SECONDARY_ACTIVITY: &str = "Vocabulary review";

const BALANCED_SUGGESTION: &str =
    "Keep developing evenly: spend a similar amount of time on every module each week.";

/// Entry in today's activity list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodayActivity {
    pub activity: String,
    /// Minutes.
    pub duration: u32,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::High => write!(f, "high"),
            Priority::Medium => write!(f, "medium"),
            Priority::Low => write!(f, "low"),
        }
    }
}

/// One activity scheduled on a day of the week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedActivity {
    pub name: String,
    pub duration: u32,
    pub priority: Priority,
}

/// What a day of the weekly plan concentrates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekFocus {
    Vocabulary,
    Listening,
    Reading,
    Writing,
    Translation,
    Review,
    Practice,
}

impl WeekFocus {
    /// The fixed Monday..Sunday sequence.
    pub const SEQUENCE: [WeekFocus; 7] = [
        WeekFocus::Vocabulary,
        WeekFocus::Listening,
        WeekFocus::Reading,
        WeekFocus::Writing,
        WeekFocus::Translation,
        WeekFocus::Review,
        WeekFocus::Practice,
    ];

    pub fn domain(&self) -> Option<Domain> {
        match self {
            WeekFocus::Vocabulary => Some(Domain::Vocabulary),
            WeekFocus::Listening => Some(Domain::Listening),
            WeekFocus::Reading => Some(Domain::Reading),
            WeekFocus::Writing => Some(Domain::Writing),
            WeekFocus::Translation => Some(Domain::Translation),
            WeekFocus::Review | WeekFocus::Practice => None,
        }
    }

    fn activity_name(&self) -> &'static str {
        match self {
            WeekFocus::Vocabulary => "Vocabulary study and quiz",
            WeekFocus::Listening => "Listening and intensive listening",
            WeekFocus::Reading => "Reading comprehension training",
            WeekFocus::Writing => "Writing practice and templates",
            WeekFocus::Translation => "Translation techniques and practice",
            WeekFocus::Review => "Review of the week's material",
            WeekFocus::Practice => "Mock test practice",
        }
    }
}

impl fmt::Display for WeekFocus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self, self.domain()) {
            (_, Some(domain)) => write!(f, "{domain}"),
            (WeekFocus::Review, None) => write!(f, "review"),
            (_, None) => write!(f, "practice"),
        }
    }
}

/// One day of the weekly plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayPlan {
    pub day: String,
    pub focus: WeekFocus,
    pub activities: Vec<PlannedActivity>,
}

/// Either a specific weak domain or balanced development.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum FocusTarget {
    Domain(Domain),
    Balanced,
}

impl fmt::Display for FocusTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FocusTarget::Domain(domain) => write!(f, "{domain}"),
            FocusTarget::Balanced => write!(f, "balanced"),
        }
    }
}

impl FromStr for FocusTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("balanced") {
            Ok(FocusTarget::Balanced)
        } else {
            s.parse().map(FocusTarget::Domain)
        }
    }
}

impl From<FocusTarget> for String {
    fn from(target: FocusTarget) -> Self {
        target.to_string()
    }
}

impl TryFrom<String> for FocusTarget {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusArea {
    pub domain: FocusTarget,
    pub suggestion: String,
}

/// Today's activities, the weekly plan and the focus areas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningPlan {
    pub today: Vec<TodayActivity>,
    pub this_week: Vec<DayPlan>,
    pub focus_areas: Vec<FocusArea>,
}

/// Build the plan for weak points ordered by priority (highest first).
pub fn learning_plan(weak_points: &[WeakPoint]) -> LearningPlan {
    let top = weak_points.first().map(|w| w.domain);

    let focus_areas = if weak_points.is_empty() {
        vec![FocusArea {
            domain: FocusTarget::Balanced,
            suggestion: BALANCED_SUGGESTION.to_string(),
        }]
    } else {
        weak_points
            .iter()
            .map(|w| FocusArea {
                domain: FocusTarget::Domain(w.domain),
                suggestion: suggestion_for(w.domain).to_string(),
            })
            .collect()
    };

    let today = match top {
        Some(domain) => today_for(domain),
        None => balanced_today(),
    };

    LearningPlan {
        today,
        this_week: weekly_plan(top),
        focus_areas,
    }
}

/// The seven-day plan, emphasising the day whose focus is `top`.
pub fn weekly_plan(top: Option<Domain>) -> Vec<DayPlan> {
    DAYS.iter()
        .zip(WeekFocus::SEQUENCE)
        .map(|(day, focus)| {
            let emphasised = top.is_some() && focus.domain() == top;
            let mut activities = vec![PlannedActivity {
                name: focus.activity_name().to_string(),
                duration: if emphasised {
                    EMPHASIS_MINUTES
                } else {
                    REGULAR_MINUTES
                },
                priority: if emphasised {
                    Priority::High
                } else {
                    Priority::Medium
                },
            }];
            if focus.domain().is_some() {
                activities.push(PlannedActivity {
                    name: SECONDARY_ACTIVITY.to_string(),
                    duration: SECONDARY_MINUTES,
                    priority: Priority::Low,
                });
            }
            DayPlan {
                day: day.to_string(),
                focus,
                activities,
            }
        })
        .collect()
}

fn activity(name: &str, duration: u32, description: &str) -> TodayActivity {
    TodayActivity {
        activity: name.to_string(),
        duration,
        description: description.to_string(),
    }
}

fn today_for(domain: Domain) -> Vec<TodayActivity> {
    match domain {
        Domain::Vocabulary => vec![
            activity("Vocabulary study", 30, "Review 20 learned words and learn 10 new ones"),
            activity("Vocabulary quiz", 15, "Complete one vocabulary quiz to consolidate memory"),
        ],
        Domain::Listening => vec![
            activity(
                "Listening practice",
                30,
                "Complete one listening passage, focusing on detail comprehension",
            ),
            activity("Intensive listening", 20, "Pick one recording and work through it sentence by sentence"),
        ],
        Domain::Reading => vec![
            activity("Reading comprehension", 30, "Complete two careful-reading passages within the time limit"),
            activity("Long sentence analysis", 15, "Break down the structure of five long, complex sentences"),
        ],
        Domain::Writing => vec![
            activity("Writing template study", 20, "Memorise and write out one essay template"),
            activity("Writing practice", 30, "Write one essay based on the template"),
        ],
        Domain::Translation => vec![
            activity("Translation practice", 25, "Translate five sentences, paying attention to word choice"),
            activity("Translation techniques", 20, "Study translation techniques to improve accuracy"),
        ],
    }
}

fn balanced_today() -> Vec<TodayActivity> {
    vec![
        activity("Vocabulary review", 15, "Review 15 learned words"),
        activity("Listening practice", 20, "Complete one listening exercise"),
        activity("Reading practice", 20, "Complete one reading exercise"),
    ]
}

/// Study advice for a weak domain.
pub fn suggestion_for(domain: Domain) -> &'static str {
    match domain {
        Domain::Vocabulary => {
            "Spend 30 minutes a day on new words and 20 minutes reviewing old ones. Use spaced \
             repetition and focus on high-frequency vocabulary."
        }
        Domain::Listening => {
            "Train listening for at least 45 minutes a day, mixing intensive and extensive \
             listening. Work sentence by sentence when listening intensively."
        }
        Domain::Reading => {
            "Complete two or three timed reading passages a day. Practise locating keywords and \
             untangling long sentences."
        }
        Domain::Writing => {
            "Write at least three essays a week using memorised templates. Collect advanced \
             vocabulary and sentence patterns."
        }
        Domain::Translation => {
            "Practise translation for 15 to 20 minutes a day, paying attention to differences \
             between the two languages and to common set expressions."
        }
    }
}
