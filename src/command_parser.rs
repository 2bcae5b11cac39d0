use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// A recognised user command, carrying the text shown back to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    OpenUrl {
        url: String,
        message: String,
    },
    SearchVideo {
        query: String,
        message: String,
    },
    SetReminder {
        delay_minutes: u64,
        text: String,
        message: String,
    },
}

/// What the browser needs to carry out an action. Serialized next to the reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionMetadata {
    OpenUrl { url: String },
    SearchYoutube { query: String },
    SetReminder { delay_minutes: u64, text: String },
}

impl Action {
    pub fn message(&self) -> &str {
        match self {
            Action::OpenUrl { message, .. }
            | Action::SearchVideo { message, .. }
            | Action::SetReminder { message, .. } => message,
        }
    }

    /// Split into the reply text and the metadata sent to the client.
    pub fn into_parts(self) -> (String, ActionMetadata) {
        match self {
            Action::OpenUrl { url, message } => (message, ActionMetadata::OpenUrl { url }),
            Action::SearchVideo { query, message } => {
                (message, ActionMetadata::SearchYoutube { query })
            }
            Action::SetReminder {
                delay_minutes,
                text,
                message,
            } => (message, ActionMetadata::SetReminder { delay_minutes, text }),
        }
    }
}

/// Input as seen by the rules: trimmed original text plus a lowercased copy.
struct Utterance<'a> {
    text: &'a str,
    lowered: String,
}

impl<'a> Utterance<'a> {
    fn new(raw: &'a str) -> Self {
        let text = raw.trim();
        Self {
            text,
            lowered: text.to_lowercase(),
        }
    }

    fn mentions(&self, phrase: &str) -> bool {
        self.lowered.contains(phrase)
    }
}

struct Site {
    url: &'static str,
    message: &'static str,
}

impl Site {
    fn open(&self) -> Action {
        Action::OpenUrl {
            url: self.url.to_string(),
            message: self.message.to_string(),
        }
    }
}

const YOUTUBE: Site = Site {
    url: "https://www.youtube.com/",
    message: "Opening YouTube in a new tab.",
};

const GOOGLE: Site = Site {
    url: "https://www.google.com/",
    message: "Opening Google search.",
};

const CHATGPT: Site = Site {
    url: "https://chatgpt.com/",
    message: "Opening ChatGPT.",
};

const WHATSAPP: Site = Site {
    url: "https://web.whatsapp.com/",
    message: "Opening WhatsApp Web.",
};

// Desktop apps can't be launched from a browser tab, so "chrome" opens Google.
const CHROME: Site = Site {
    url: "https://www.google.com/",
    message: "I can’t open desktop apps directly, but I’ve opened Google in your browser.",
};

static PLAY_ON_YOUTUBE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)play\s+(.+?)\s+on\s+youtube").expect("play pattern is valid")
});

static REMIND_IN_MINUTES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)remind me in ([0-9]+)\s+minutes?\s+to\s+(.+)")
        .expect("reminder pattern is valid")
});

const PLAY_PREFIX: &str = "play ";

type Matcher = fn(&Utterance<'_>) -> Option<Action>;

/// One entry of the ordered rule table.
struct Rule {
    name: &'static str,
    matcher: Matcher,
}

/// Evaluated top to bottom; the first rule that returns an action wins.
const RULES: &[Rule] = &[
    Rule {
        name: "open_youtube",
        matcher: |u| u.mentions("open youtube").then(|| YOUTUBE.open()),
    },
    Rule {
        name: "open_google",
        matcher: |u| u.mentions("open google").then(|| GOOGLE.open()),
    },
    Rule {
        name: "open_chatgpt",
        matcher: |u| u.mentions("open chatgpt").then(|| CHATGPT.open()),
    },
    Rule {
        name: "open_whatsapp",
        // The second phrase is subsumed by the first and never decides a match.
        matcher: |u| {
            (u.mentions("open whatsapp") || u.mentions("open whatsapp web"))
                .then(|| WHATSAPP.open())
        },
    },
    Rule {
        name: "open_chrome",
        matcher: |u| u.mentions("open chrome").then(|| CHROME.open()),
    },
    Rule {
        name: "play_on_youtube",
        matcher: play_on_youtube,
    },
    Rule {
        name: "play",
        matcher: play,
    },
    Rule {
        name: "remind_in_minutes",
        matcher: remind_in_minutes,
    },
];

fn play_on_youtube(u: &Utterance<'_>) -> Option<Action> {
    let captures = PLAY_ON_YOUTUBE.captures(u.text)?;
    let query = captures.get(1)?.as_str().trim().to_string();
    Some(Action::SearchVideo {
        message: format!("Searching YouTube for “{}”.", query),
        query,
    })
}

fn play(u: &Utterance<'_>) -> Option<Action> {
    if !u.lowered.starts_with(PLAY_PREFIX) {
        return None;
    }
    // Fixed-width strip on the original-case text.
    let query = u.text.get(PLAY_PREFIX.len()..)?.trim();
    if query.is_empty() {
        return None;
    }
    Some(Action::SearchVideo {
        query: query.to_string(),
        message: format!("Playing “{}” on YouTube (search tab opened).", query),
    })
}

fn remind_in_minutes(u: &Utterance<'_>) -> Option<Action> {
    let captures = REMIND_IN_MINUTES.captures(u.text)?;
    let delay_minutes: u64 = captures.get(1)?.as_str().parse().ok()?;
    let text = captures.get(2)?.as_str().trim().to_string();
    Some(Action::SetReminder {
        message: format!(
            "Okay, I’ll set a reminder in {} minute(s) to {}. Keep this tab open so the alert can fire.",
            delay_minutes, text
        ),
        delay_minutes,
        text,
    })
}

/// Maps raw chat input onto a command, if it is one.
pub struct CommandParser;

impl CommandParser {
    pub fn parse(input: &str) -> Option<Action> {
        let utterance = Utterance::new(input);
        RULES.iter().find_map(|rule| {
            let action = (rule.matcher)(&utterance)?;
            debug!("Command rule '{}' matched", rule.name);
            Some(action)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url_of(action: Option<Action>) -> String {
        match action {
            Some(Action::OpenUrl { url, .. }) => url,
            other => panic!("expected OpenUrl, got {:?}", other),
        }
    }

    fn query_of(action: Option<Action>) -> String {
        match action {
            Some(Action::SearchVideo { query, .. }) => query,
            other => panic!("expected SearchVideo, got {:?}", other),
        }
    }

    #[test]
    fn test_open_youtube_any_case_and_position() {
        for input in [
            "open youtube",
            "OPEN YouTube",
            "hey can you Open YouTube for me",
            "   please open youtube now   ",
        ] {
            assert_eq!(url_of(CommandParser::parse(input)), "https://www.youtube.com/");
        }
    }

    #[test]
    fn test_open_sites() {
        assert_eq!(url_of(CommandParser::parse("open google")), "https://www.google.com/");
        assert_eq!(url_of(CommandParser::parse("Open ChatGPT")), "https://chatgpt.com/");
        assert_eq!(url_of(CommandParser::parse("open whatsapp")), "https://web.whatsapp.com/");
        assert_eq!(
            url_of(CommandParser::parse("open WhatsApp web please")),
            "https://web.whatsapp.com/"
        );
    }

    #[test]
    fn test_open_chrome_explains_itself() {
        let action = CommandParser::parse("open chrome").unwrap();
        assert!(action.message().contains("can’t open desktop apps"));
        assert_eq!(url_of(Some(action)), "https://www.google.com/");
    }

    #[test]
    fn test_open_rules_are_ordered() {
        // Both phrases present: YouTube is checked first.
        assert_eq!(
            url_of(CommandParser::parse("open google then open youtube")),
            "https://www.youtube.com/"
        );
        // "open youtube" wins over the play pattern as well.
        assert_eq!(
            url_of(CommandParser::parse("play lofi on youtube and open youtube")),
            "https://www.youtube.com/"
        );
    }

    #[test]
    fn test_play_on_youtube() {
        let action = CommandParser::parse("play shape of you on youtube").unwrap();
        assert_eq!(action.message(), "Searching YouTube for “shape of you”.");
        assert_eq!(query_of(Some(action)), "shape of you");
    }

    #[test]
    fn test_play_on_youtube_preempts_bare_play() {
        let action = CommandParser::parse("Play  Despacito   ON YouTube").unwrap();
        assert!(action.message().starts_with("Searching YouTube"));
        assert_eq!(query_of(Some(action)), "Despacito");
    }

    #[test]
    fn test_bare_play() {
        let action = CommandParser::parse("play lofi beats").unwrap();
        assert_eq!(
            action.message(),
            "Playing “lofi beats” on YouTube (search tab opened)."
        );
        assert_eq!(query_of(Some(action)), "lofi beats");
    }

    #[test]
    fn test_bare_play_keeps_original_case() {
        assert_eq!(query_of(CommandParser::parse("PLAY Arijit Singh")), "Arijit Singh");
    }

    #[test]
    fn test_bare_play_needs_a_query() {
        assert_eq!(CommandParser::parse("play"), None);
        assert_eq!(CommandParser::parse("play    "), None);
        assert_eq!(CommandParser::parse("playlist ideas"), None);
    }

    #[test]
    fn test_reminder() {
        let action = CommandParser::parse("remind me in 10 minutes to study").unwrap();
        assert_eq!(
            action.message(),
            "Okay, I’ll set a reminder in 10 minute(s) to study. Keep this tab open so the alert can fire."
        );
        assert_eq!(
            action.into_parts().1,
            ActionMetadata::SetReminder {
                delay_minutes: 10,
                text: "study".to_string()
            }
        );
    }

    #[test]
    fn test_reminder_singular_and_case() {
        match CommandParser::parse("Remind Me in 1 minute to drink water ") {
            Some(Action::SetReminder {
                delay_minutes, text, ..
            }) => {
                assert_eq!(delay_minutes, 1);
                assert_eq!(text, "drink water");
            }
            other => panic!("expected SetReminder, got {:?}", other),
        }
    }

    #[test]
    fn test_reminder_with_oversized_delay_is_not_a_command() {
        assert_eq!(
            CommandParser::parse("remind me in 99999999999999999999999 minutes to sleep"),
            None
        );
    }

    #[test]
    fn test_no_match() {
        assert_eq!(CommandParser::parse("what is recursion?"), None);
        assert_eq!(CommandParser::parse("remind me tomorrow to study"), None);
        assert_eq!(CommandParser::parse(""), None);
    }

    #[test]
    fn test_parse_is_deterministic() {
        let input = "play tum hi ho on youtube";
        assert_eq!(CommandParser::parse(input), CommandParser::parse(input));
    }

    #[test]
    fn test_metadata_wire_shape() {
        let (message, metadata) = CommandParser::parse("open google").unwrap().into_parts();
        assert_eq!(message, "Opening Google search.");
        assert_eq!(
            serde_json::to_value(&metadata).unwrap(),
            serde_json::json!({"type": "open_url", "url": "https://www.google.com/"})
        );

        let (_, metadata) = CommandParser::parse("play lofi").unwrap().into_parts();
        assert_eq!(
            serde_json::to_value(&metadata).unwrap(),
            serde_json::json!({"type": "search_youtube", "query": "lofi"})
        );

        let (_, metadata) = CommandParser::parse("remind me in 5 minutes to stretch")
            .unwrap()
            .into_parts();
        assert_eq!(
            serde_json::to_value(&metadata).unwrap(),
            serde_json::json!({"type": "set_reminder", "delay_minutes": 5, "text": "stretch"})
        );
    }
}
