//! Personas: named presets for the system message

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ColloquyError;

const SASSY_ASSISTANT: &str = "A sassy assistant who is fed up with answering questions.";
const ANGRY_ASSISTANT: &str = "An angry assistant that likes yelling in all caps.";
const THOUGHTFUL_ASSISTANT: &str = "A thoughtful assistant, always ready to dig deeper. This assistant asks clarifying questions to ensure understanding and approaches problems with a step-by-step methodology.";

/// System message used when neither a message nor a persona is configured
pub const DEFAULT_SYSTEM_MESSAGE: &str = SASSY_ASSISTANT;

/// A persona name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Persona {
    #[default]
    SassyAssistant,
    AngryAssistant,
    ThoughtfulAssistant,
    /// Caller-supplied text registered on the [`PersonaTable`]
    Custom,
}

impl Persona {
    /// Personas with fixed text, in display order
    pub const BUILT_IN: [Persona; 3] = [
        Persona::SassyAssistant,
        Persona::AngryAssistant,
        Persona::ThoughtfulAssistant,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Persona::SassyAssistant => "sassy_assistant",
            Persona::AngryAssistant => "angry_assistant",
            Persona::ThoughtfulAssistant => "thoughtful_assistant",
            Persona::Custom => "custom",
        }
    }

    /// Fixed text of a built-in persona; `None` for [`Persona::Custom`]
    pub fn builtin_text(&self) -> Option<&'static str> {
        match self {
            Persona::SassyAssistant => Some(SASSY_ASSISTANT),
            Persona::AngryAssistant => Some(ANGRY_ASSISTANT),
            Persona::ThoughtfulAssistant => Some(THOUGHTFUL_ASSISTANT),
            Persona::Custom => None,
        }
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Persona {
    type Err = ColloquyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sassy_assistant" => Ok(Persona::SassyAssistant),
            "angry_assistant" => Ok(Persona::AngryAssistant),
            "thoughtful_assistant" => Ok(Persona::ThoughtfulAssistant),
            "custom" => Ok(Persona::Custom),
            other => Err(ColloquyError::UnknownPersona(other.to_string())),
        }
    }
}

/// Built-in personas plus at most one custom system message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonaTable {
    custom: Option<String>,
}

impl PersonaTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text for `persona`, if it has any
    pub fn text(&self, persona: Persona) -> Option<&str> {
        match persona {
            Persona::Custom => self.custom.as_deref(),
            builtin => builtin.builtin_text(),
        }
    }

    /// Resolve a persona name to its system-message text.
    ///
    /// # Errors
    ///
    /// [`ColloquyError::UnknownPersona`] if the name is not a persona, or is
    /// `custom` while no custom message is registered.
    pub fn resolve(&self, name: &str) -> Result<&str, ColloquyError> {
        let persona: Persona = name.parse()?;
        self.text(persona)
            .ok_or_else(|| ColloquyError::UnknownPersona(name.to_string()))
    }

    /// Whether `text` is the text of any known persona
    pub fn contains_text(&self, text: &str) -> bool {
        self.entries().any(|(_, t)| t == text)
    }

    /// Register `text` as the custom persona.
    ///
    /// Empty text and text already used by a persona are ignored. Returns
    /// whether the table changed.
    pub fn set_custom(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        if text.is_empty() || self.contains_text(&text) {
            return false;
        }
        self.custom = Some(text);
        true
    }

    pub fn custom(&self) -> Option<&str> {
        self.custom.as_deref()
    }

    /// Every persona that currently has text
    pub fn entries(&self) -> impl Iterator<Item = (Persona, &str)> + '_ {
        Persona::BUILT_IN
            .iter()
            .filter_map(|p| p.builtin_text().map(|t| (*p, t)))
            .chain(self.custom.as_deref().map(|t| (Persona::Custom, t)))
    }
}
