use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entry::Mode;

/// How firmly a rule matched. `Fallback` is reserved for `Mode::Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    Exact,
    Heuristic,
    Fallback,
}

impl ConfidenceTier {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Heuristic => "heuristic",
            Self::Fallback => "fallback",
        }
    }
}

impl fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub mode: Mode,
    pub intent: String,
    pub confidence: ConfidenceTier,
}

impl Classification {
    fn fallback() -> Self {
        Self {
            mode: Mode::Unknown,
            intent: String::new(),
            confidence: ConfidenceTier::Fallback,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum Predicate {
    /// Imperative verb in lead position, or anywhere in a polite request.
    Imperative(&'static [&'static str]),
    /// Any keyword anywhere; two or more distinct hits count as exact.
    Keywords(&'static [&'static str]),
    /// Keyword only in lead position.
    Lead(&'static [&'static str]),
    /// Trailing question mark or a leading interrogative.
    Question(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct ClassificationRule {
    pub mode: Mode,
    pub intent: &'static str,
    pub predicate: Predicate,
}

const fn rule(mode: Mode, intent: &'static str, predicate: Predicate) -> ClassificationRule {
    ClassificationRule {
        mode,
        intent,
        predicate,
    }
}

pub(crate) const RULES: &[ClassificationRule] = &[
    rule(Mode::Instruction, "explain", Predicate::Imperative(&["explain", "clarify", "elaborate"])),
    rule(Mode::Instruction, "describe", Predicate::Imperative(&["describe", "outline", "tell me about"])),
    rule(Mode::Instruction, "summarize", Predicate::Imperative(&["summarize", "summarise", "recap"])),
    rule(Mode::Instruction, "list", Predicate::Imperative(&["list", "enumerate", "name"])),
    rule(Mode::Instruction, "write", Predicate::Imperative(&["write", "compose", "draft", "generate", "create"])),
    rule(Mode::Instruction, "translate", Predicate::Imperative(&["translate", "rephrase", "rewrite"])),
    rule(Mode::Instruction, "compare", Predicate::Imperative(&["compare", "contrast"])),
    rule(Mode::Instruction, "define", Predicate::Imperative(&["define"])),
    rule(Mode::Instruction, "answer", Predicate::Imperative(&["answer", "respond to"])),
    rule(
        Mode::Reasoning,
        "infer",
        Predicate::Keywords(&["therefore", "thus", "hence", "consequently", "it follows", "implies", "conclude"]),
    ),
    rule(Mode::Reasoning, "justify", Predicate::Keywords(&["because", "why", "reason", "since", "due to"])),
    rule(
        Mode::Reasoning,
        "solve",
        Predicate::Keywords(&["step by step", "calculate", "prove", "derive", "solve"]),
    ),
    rule(
        Mode::Conversation,
        "greet",
        Predicate::Keywords(&["hi", "hello", "hey", "greetings", "good morning", "good evening"]),
    ),
    rule(Mode::Conversation, "thank", Predicate::Keywords(&["thanks", "thank you", "cheers"])),
    rule(
        Mode::Conversation,
        "answer",
        Predicate::Lead(&["yes", "no", "sure", "okay", "ok", "yeah", "nope"]),
    ),
    rule(
        Mode::Conversation,
        "ask",
        Predicate::Question(&[
            "what", "who", "where", "when", "how", "which", "is", "are", "do", "does", "can",
            "could", "would", "should", "will",
        ]),
    ),
    rule(
        Mode::Narrative,
        "recount",
        Predicate::Keywords(&[
            "once upon a time", "one day", "yesterday", "last week", "last year", "years ago",
            "remember when", "back then",
        ]),
    ),
    rule(Mode::Narrative, "describe", Predicate::Keywords(&["was", "were", "had", "used to"])),
];

const POLITE_PREFIXES: &[&[&str]] = &[
    &["please"],
    &["kindly"],
    &["can", "you"],
    &["could", "you"],
    &["would", "you"],
    &["will", "you"],
];

struct Signals {
    tokens: Vec<String>,
    lead: usize,
    polite: bool,
    question: bool,
}

impl Signals {
    fn new(text: &str) -> Self {
        let tokens = crate::profile::tokenize(text);

        let mut lead = 0;
        let mut polite = false;
        'strip: loop {
            for prefix in POLITE_PREFIXES {
                if starts_with_words(&tokens[lead..], prefix) {
                    lead += prefix.len();
                    polite = true;
                    continue 'strip;
                }
            }
            break;
        }
        polite |= tokens.iter().any(|t| t == "please" || t == "kindly");

        Self {
            tokens,
            lead,
            polite,
            question: text.trim_end().ends_with('?'),
        }
    }

    fn lead_matches(&self, keywords: &[&str]) -> bool {
        keywords.iter().any(|k| {
            let words: Vec<&str> = k.split(' ').collect();
            starts_with_words(&self.tokens[self.lead.min(self.tokens.len())..], &words)
        })
    }

    fn hits(&self, keywords: &[&str]) -> usize {
        keywords
            .iter()
            .filter(|k| {
                let words: Vec<&str> = k.split(' ').collect();
                self.tokens
                    .windows(words.len())
                    .any(|w| w.iter().zip(&words).all(|(t, k)| t == k))
            })
            .count()
    }
}

fn starts_with_words(tokens: &[String], words: &[&str]) -> bool {
    tokens.len() >= words.len() && tokens.iter().zip(words).all(|(t, w)| t == w)
}

impl Predicate {
    fn evaluate(self, signals: &Signals) -> Option<ConfidenceTier> {
        match self {
            Self::Imperative(verbs) => {
                if signals.lead_matches(verbs) {
                    Some(ConfidenceTier::Exact)
                } else if signals.polite && signals.hits(verbs) > 0 {
                    Some(ConfidenceTier::Heuristic)
                } else {
                    None
                }
            }
            Self::Keywords(keywords) => {
                let hits = signals.hits(keywords);
                if hits == 0 {
                    None
                } else if hits >= 2 || signals.lead_matches(keywords) {
                    Some(ConfidenceTier::Exact)
                } else {
                    Some(ConfidenceTier::Heuristic)
                }
            }
            Self::Lead(keywords) => signals
                .lead_matches(keywords)
                .then_some(ConfidenceTier::Exact),
            Self::Question(interrogatives) => {
                match (signals.question, signals.lead_matches(interrogatives)) {
                    (true, true) => Some(ConfidenceTier::Exact),
                    (true, false) | (false, true) => Some(ConfidenceTier::Heuristic),
                    (false, false) => None,
                }
            }
        }
    }
}

/// Tags `text` with a mode and intent label.
///
/// Deterministic and total: empty or whitespace-only input yields
/// `(Mode::Unknown, "")`.
pub fn classify(text: &str) -> (Mode, String) {
    let c = classify_detailed(text);
    (c.mode, c.intent)
}

pub fn classify_detailed(text: &str) -> Classification {
    classify_with(RULES, text)
}

/// Evaluates every rule and keeps the match with the best mode priority;
/// table position only breaks ties within one mode.
pub(crate) fn classify_with(rules: &[ClassificationRule], text: &str) -> Classification {
    let signals = Signals::new(text);
    if signals.tokens.is_empty() {
        return Classification::fallback();
    }

    rules
        .iter()
        .enumerate()
        .filter_map(|(idx, r)| r.predicate.evaluate(&signals).map(|tier| (idx, r, tier)))
        .min_by_key(|(idx, r, _)| (r.mode.priority(), *idx))
        .map_or_else(Classification::fallback, |(_, r, confidence)| Classification {
            mode: r.mode,
            intent: r.intent.to_string(),
            confidence,
        })
}
