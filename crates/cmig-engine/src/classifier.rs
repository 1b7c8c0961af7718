//! Command classifier
//!
//! Two fixed recognizers look at declared invocation methods and
//! supertypes. Exactly one matching recognizer decides the category;
//! anything else is `Unknown` with a note explaining why.

use cmig_model::{Category, Classification, CommandUnit, Confidence};

/// Fixed signal lists for one category
#[derive(Debug, Clone, Copy)]
pub struct Recognizer {
    pub category: Category,
    pub methods: &'static [&'static str],
    pub supertypes: &'static [&'static str],
}

/// Request/response lifecycle commands
pub const REQUEST_ENTRY: Recognizer = Recognizer {
    category: Category::RequestHandler,
    methods: &["performExecute", "handleRequest", "doGet", "doPost"],
    supertypes: &["ControllerCommand", "ControllerCommandImpl"],
};

/// Unattended commands
pub const BACKGROUND_TASK: Recognizer = Recognizer {
    category: Category::BackgroundTask,
    methods: &["run", "executeTask", "performTask", "performJob"],
    supertypes: &[
        "TaskCommand",
        "TaskCommandImpl",
        "ScheduledJob",
        "AbstractJobPerformable",
    ],
};

/// Which signals of a recognizer fired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Signals {
    pub method: bool,
    pub supertype: bool,
}

impl Signals {
    #[inline]
    #[must_use]
    pub const fn any(self) -> bool {
        self.method || self.supertype
    }

    #[inline]
    #[must_use]
    pub const fn confidence(self) -> Confidence {
        match (self.method, self.supertype) {
            (true, true) => Confidence::High,
            (true, false) | (false, true) => Confidence::Medium,
            (false, false) => Confidence::None,
        }
    }
}

impl Recognizer {
    #[must_use]
    pub fn signals(&self, unit: &CommandUnit) -> Signals {
        Signals {
            method: unit
                .invocation_methods()
                .iter()
                .any(|m| self.methods.contains(&m.as_str())),
            supertype: unit
                .supertypes()
                .iter()
                .any(|s| self.supertypes.contains(&s.as_str())),
        }
    }
}

/// Classification a unit would receive, without fixing it
#[must_use]
pub fn classification_of(unit: &CommandUnit) -> Classification {
    let request = REQUEST_ENTRY.signals(unit);
    let task = BACKGROUND_TASK.signals(unit);

    match (request.any(), task.any()) {
        (true, false) => Classification::new(Category::RequestHandler, request.confidence()),
        (false, true) => Classification::new(Category::BackgroundTask, task.confidence()),
        (true, true) => Classification::new(Category::Unknown, Confidence::None).with_note(
            format!(
                "ambiguous: matches both request-entry and background-task recognizers ({})",
                unit.invocation_methods().join(", ")
            ),
        ),
        (false, false) => Classification::new(Category::Unknown, Confidence::None).with_note(
            format!(
                "no recognizer matched invocation methods [{}] or supertypes [{}]",
                unit.invocation_methods().join(", "),
                unit.supertypes().join(", ")
            ),
        ),
    }
}

/// Fix a category onto the unit
///
/// Never fails. A unit that is already classified comes back unchanged.
#[must_use]
pub fn classify(unit: CommandUnit) -> CommandUnit {
    if unit.is_classified() {
        return unit;
    }
    let classification = classification_of(&unit);
    tracing::debug!(
        unit = unit.name(),
        category = %classification.category,
        confidence = ?classification.confidence,
        "classified"
    );
    unit.with_classification(classification)
}
