//! Prompt construction for commit message generation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Language the commit message is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    /// Simplified Chinese.
    Cn,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Cn => "cn",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Language::En),
            "cn" | "zh" | "chinese" => Ok(Language::Cn),
            other => Err(format!("unknown language '{other}' (expected 'en' or 'cn')")),
        }
    }
}

/// Knobs that shape the system prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptOptions {
    pub language: Language,
    /// Ask for a 3-5 line description body under the subject.
    pub with_description: bool,
    /// Separator between multiple changes listed in one subject line.
    /// Empty means no instruction is added.
    pub subject_separator: String,
}

/// One chat message, shared by both wire formats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

const COMMIT_TYPES: &[(&str, &str)] = &[
    ("feat", "A new feature or user-visible capability."),
    ("fix", "A bug fix."),
    ("build", "Changes to the build system or dependencies, such as bumping a toolchain version."),
    ("chore", "Non-business code such as tool configuration or housekeeping."),
    ("ci", "Continuous integration workflow changes."),
    ("docs", "Documentation only, such as README or API docs."),
    ("style", "Formatting only: indentation, whitespace, blank lines."),
    ("refactor", "Restructuring or renaming without changing behavior."),
    ("perf", "Performance improvements or reduced memory usage."),
    ("test", "Adding or correcting tests."),
];

const LANG_INSTRUCTION_EN: &str = "- The commit message **MUST** be written in English.";
const LANG_INSTRUCTION_CN: &str =
    "- The commit message **MUST** be written in Simplified Chinese (简体中文).";
const DESCRIPTION_INSTRUCTION: &str = "- Provide a detailed description body of around 3 - 5 lines, \
     each line **MUST** be less than 72 characters. Leave a blank line after the subject.";

/// Build the system prompt for the given options.
pub fn system_prompt(opts: &PromptOptions) -> String {
    let mut types = String::new();
    for (name, meaning) in COMMIT_TYPES {
        types.push_str(&format!("- {name}: {meaning}\n"));
    }

    let mut restrictions = vec![
        "- Use the Conventional Commits format: <type>[optional scope]: <subject>".to_string(),
        "- The subject line **MUST** be less than 100 characters.".to_string(),
        "- Do NOT include markdown blocks (like ``` code fences). Just return the raw message."
            .to_string(),
    ];
    restrictions.push(match opts.language {
        Language::En => LANG_INSTRUCTION_EN.to_string(),
        Language::Cn => LANG_INSTRUCTION_CN.to_string(),
    });
    if opts.with_description {
        restrictions.push(DESCRIPTION_INSTRUCTION.to_string());
    } else {
        restrictions.push("- Return the subject line only, without a body.".to_string());
    }
    let separator = opts.subject_separator.trim();
    if !separator.is_empty() {
        restrictions.push(format!(
            "- When the subject covers several changes, separate them with \"{separator}\"."
        ));
    }

    format!(
        "<role>\nYou are an expert developer and git specialist.\n</role>\n\
         <goal>\nGenerate a concise and standardized git commit message based on the provided code changes (diff).\n</goal>\n\
         <context>\nUse one of the following types:\n{types}</context>\n\
         <restriction>\n{}\n</restriction>\n",
        restrictions.join("\n")
    )
}

/// Build the user turn carrying the diff.
pub fn user_prompt(diff: &str) -> String {
    format!("Here is the git diff output:\n\n{diff}")
}

/// System + user messages for one generation request.
pub fn build_messages(opts: &PromptOptions, diff: &str) -> Vec<Message> {
    vec![Message::system(system_prompt(opts)), Message::user(user_prompt(diff))]
}
