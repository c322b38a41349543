use serde::Serialize;

/// The five fixed labels a description is broken down into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Person,
    Setting,
    Objects,
    Style,
    Mood,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Person,
        Category::Setting,
        Category::Objects,
        Category::Style,
        Category::Mood,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Person => "Person",
            Category::Setting => "Setting",
            Category::Objects => "Objects",
            Category::Style => "Style",
            Category::Mood => "Mood",
        }
    }
}

/// Keyword breakdown of a description. Every category is always present;
/// serialization keeps the fixed category order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KeywordResult {
    #[serde(rename = "Person")]
    pub person: Vec<String>,
    #[serde(rename = "Setting")]
    pub setting: Vec<String>,
    #[serde(rename = "Objects")]
    pub objects: Vec<String>,
    #[serde(rename = "Style")]
    pub style: Vec<String>,
    #[serde(rename = "Mood")]
    pub mood: Vec<String>,
}

impl KeywordResult {
    pub fn get(&self, category: Category) -> &[String] {
        match category {
            Category::Person => &self.person,
            Category::Setting => &self.setting,
            Category::Objects => &self.objects,
            Category::Style => &self.style,
            Category::Mood => &self.mood,
        }
    }

    fn get_mut(&mut self, category: Category) -> &mut Vec<String> {
        match category {
            Category::Person => &mut self.person,
            Category::Setting => &mut self.setting,
            Category::Objects => &mut self.objects,
            Category::Style => &mut self.style,
            Category::Mood => &mut self.mood,
        }
    }

    pub fn is_empty(&self) -> bool {
        Category::ALL
            .iter()
            .all(|category| self.get(*category).is_empty())
    }

    /// Non-empty categories in display order, e.g. `Mood: happy, cheerful`.
    pub fn summary_lines(&self) -> Vec<String> {
        Category::ALL
            .iter()
            .filter(|category| !self.get(**category).is_empty())
            .map(|category| format!("{}: {}", category.label(), self.get(*category).join(", ")))
            .collect()
    }
}

#[derive(Debug, Clone, Copy)]
enum Action {
    Set(Category, &'static [&'static str]),
    Append(Category, &'static str),
}

#[derive(Debug, Clone, Copy)]
struct Rule {
    triggers: &'static [&'static str],
    actions: &'static [Action],
}

impl Rule {
    fn matches(&self, text: &str) -> bool {
        self.triggers.iter().any(|trigger| text.contains(trigger))
    }
}

#[derive(Debug, Clone, Copy)]
enum Step {
    Apply(Rule),
    /// Only the first matching rule in the group runs.
    FirstOf(&'static [Rule]),
}

const PERSON: Rule = Rule {
    triggers: &["person", "man", "woman", "girl", "boy", "people"],
    actions: &[Action::Set(Category::Person, &["adult", "casual clothes"])],
};

const HAPPY: Rule = Rule {
    triggers: &["happy", "smile", "joy", "laugh"],
    actions: &[
        Action::Set(Category::Mood, &["happy", "cheerful"]),
        Action::Append(Category::Person, "smiling"),
    ],
};

const SAD: Rule = Rule {
    triggers: &["sad", "unhappy", "cry", "tears"],
    actions: &[
        Action::Set(Category::Mood, &["sad", "melancholic"]),
        Action::Append(Category::Person, "frowning"),
    ],
};

const CAFE: Rule = Rule {
    triggers: &["cafe", "coffee"],
    actions: &[
        Action::Set(Category::Setting, &["cafe", "indoor"]),
        Action::Set(Category::Objects, &["coffee cup", "table", "chair"]),
    ],
};

// Runs after CAFE and overwrites it when both match.
const BEACH: Rule = Rule {
    triggers: &["beach", "ocean", "sea"],
    actions: &[
        Action::Set(Category::Setting, &["beach", "outdoor"]),
        Action::Set(Category::Objects, &["sand", "ocean", "umbrella"]),
    ],
};

const RULES: &[Step] = &[
    Step::Apply(PERSON),
    Step::FirstOf(&[HAPPY, SAD]),
    Step::Apply(CAFE),
    Step::Apply(BEACH),
];

const FALLBACK: &[Action] = &[
    Action::Set(Category::Style, &["photorealistic"]),
    Action::Set(Category::Objects, &["suggested by main description"]),
];

fn apply(result: &mut KeywordResult, actions: &[Action]) {
    for action in actions {
        match *action {
            Action::Set(category, values) => {
                *result.get_mut(category) = values.iter().map(|value| value.to_string()).collect();
            }
            Action::Append(category, value) => {
                result.get_mut(category).push(value.to_string());
            }
        }
    }
}

/// Breaks a free-text description into canned keyword phrases.
///
/// Stands in for a language-model parser. Matching is plain substring
/// presence on the lowercased text, and rules run in table order so later
/// rules overwrite earlier ones for the same category. When nothing matches
/// a generic placeholder result is returned.
pub fn classify(description: &str) -> KeywordResult {
    let text = description.to_lowercase();
    let mut result = KeywordResult::default();

    for step in RULES {
        match step {
            Step::Apply(rule) => {
                if rule.matches(&text) {
                    apply(&mut result, rule.actions);
                }
            }
            Step::FirstOf(rules) => {
                if let Some(rule) = rules.iter().find(|rule| rule.matches(&text)) {
                    apply(&mut result, rule.actions);
                }
            }
        }
    }

    if result.is_empty() {
        apply(&mut result, FALLBACK);
    }

    result
}
