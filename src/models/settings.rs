use serde::{Deserialize, Serialize};

/// Which brackets (or custom prefix/suffix/separator) a tag block uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagFormat {
    SquareBrackets,
    Brackets,
    Parentheses,
    Custom,
}

/// Whether the tag block sits before or after the basename stem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagPosition {
    Prefix,
    Suffix,
}

/// Whether tags render as one joined block or one block per tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagGrouping {
    Combined,
    Individual,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomFormat {
    pub prefix: String,
    pub suffix: String,
    pub separator: String,
}

/// The `(format, position, add_spaces, grouping, custom?)` tuple governing how
/// tag lists are encoded into and decoded from basenames.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagGrammar {
    pub format: TagFormat,
    pub custom_format: Option<CustomFormat>,
    pub position: TagPosition,
    pub add_spaces: bool,
    pub grouping: TagGrouping,
}

impl Default for TagGrammar {
    fn default() -> Self {
        TagGrammar {
            format: TagFormat::SquareBrackets,
            custom_format: None,
            position: TagPosition::Suffix,
            add_spaces: true,
            grouping: TagGrouping::Combined,
        }
    }
}

impl TagGrammar {
    /// The `(prefix, suffix, separator)` triple for this grammar.
    pub fn delimiters(&self) -> (&str, &str, &str) {
        match self.format {
            TagFormat::SquareBrackets => ("[", "]", ", "),
            TagFormat::Brackets => ("<", ">", ", "),
            TagFormat::Parentheses => ("(", ")", ", "),
            TagFormat::Custom => match &self.custom_format {
                Some(c) => (c.prefix.as_str(), c.suffix.as_str(), c.separator.as_str()),
                None => ("[", "]", ", "),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub tag_rule: TagGrammar,
}

impl Default for AppSettings {
    fn default() -> Self {
        AppSettings {
            tag_rule: TagGrammar::default(),
        }
    }
}
