//! AI command kinds and the pure pieces of each command flow.
//!
//! Every command turns some input text into a request string, then turns the
//! model's answer (or failure) into output log text. None of it does IO; the
//! shell decides when to call these and where the results go.

use std::fmt;

use serde::{
  Deserialize,
  Serialize,
};

const FENCE: &str = "```";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
  Generate,
  Explain,
  Fix,
  Optimize,
  Chat,
}

impl CommandKind {
  pub const ALL: [CommandKind; 5] = [
    CommandKind::Generate,
    CommandKind::Explain,
    CommandKind::Fix,
    CommandKind::Optimize,
    CommandKind::Chat,
  ];

  pub fn name(self) -> &'static str {
    match self {
      Self::Generate => "generate",
      Self::Explain => "explain",
      Self::Fix => "fix",
      Self::Optimize => "optimize",
      Self::Chat => "chat",
    }
  }

  /// Whether the command works on the selection (or the whole buffer).
  pub fn reads_code(self) -> bool {
    matches!(self, Self::Explain | Self::Fix | Self::Optimize)
  }

  /// Status line appended to the output log when a request goes out.
  pub fn pending_text(self) -> &'static str {
    match self {
      Self::Generate => "Generating code...",
      Self::Explain => "Analyzing code...",
      Self::Fix => "Analyzing and fixing code...",
      Self::Optimize => "Optimizing code...",
      Self::Chat => "AI: Thinking...",
    }
  }

  /// Notice shown instead of sending a request when there is no input.
  pub fn empty_input_text(self) -> &'static str {
    match self {
      Self::Generate => "Please enter a description",
      Self::Explain => "No code to explain",
      Self::Fix => "No code to fix",
      Self::Optimize => "No code to optimize",
      Self::Chat => "Please enter a question",
    }
  }
}

impl fmt::Display for CommandKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

/// What a request is built from.
///
/// `code` is the selection or buffer; `query` is what the user typed (the
/// description for generate, the question for chat).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestInput<'a> {
  pub code:  &'a str,
  pub query: &'a str,
}

impl<'a> RequestInput<'a> {
  pub fn code(code: &'a str) -> Self {
    Self { code, query: "" }
  }

  pub fn query(query: &'a str) -> Self {
    Self { code: "", query }
  }

  /// The text that must be non-empty for the command to run.
  pub fn primary(&self, kind: CommandKind) -> &'a str {
    if kind.reads_code() {
      self.code
    } else {
      self.query
    }
  }
}

/// The code a command works on: the selection when there is one, otherwise
/// the whole buffer without surrounding whitespace.
pub fn code_input(selection: Option<String>, buffer: &str) -> String {
  match selection {
    Some(selection) if !selection.is_empty() => selection,
    _ => buffer.trim().to_string(),
  }
}

pub fn build_request(kind: CommandKind, language: &str, input: &RequestInput<'_>) -> String {
  match kind {
    CommandKind::Generate => generate_request(language, input.query),
    CommandKind::Explain => explain_request(language, input.code),
    CommandKind::Fix => fix_request(language, input.code),
    CommandKind::Optimize => optimize_request(language, input.code),
    CommandKind::Chat => chat_request(input.code, input.query),
  }
}

/// Style guide named in the generate prompt.
fn style_guide(language: &str) -> String {
  if language.eq_ignore_ascii_case("python") {
    "PEP 8".to_string()
  } else {
    format!("standard {language}")
  }
}

pub fn generate_request(language: &str, description: &str) -> String {
  let style = style_guide(language);
  format!(
    "Generate {language} code based on this description: {description}

Requirements:
- Write clean, well-commented {language} code
- Include docstrings for functions and classes
- Follow {style} style guidelines
- Make the code production-ready
- Only return the code, no explanations

Code:
"
  )
}

pub fn explain_request(language: &str, code: &str) -> String {
  format!(
    "Explain this {language} code in detail:

{code}

Please provide:
1. Overall purpose and functionality
2. Step-by-step breakdown
3. Key concepts used
4. Potential improvements or issues
"
  )
}

pub fn fix_request(language: &str, code: &str) -> String {
  format!(
    "Analyze this {language} code and fix any issues:

{code}

Please:
1. Identify any syntax errors, logical errors, or potential bugs
2. Fix the issues
3. Improve code quality and efficiency
4. Return the corrected code with comments explaining the fixes

Original code with issues fixed:
"
  )
}

pub fn optimize_request(language: &str, code: &str) -> String {
  format!(
    "Optimize this {language} code for better performance and readability:

{code}

Please provide:
1. Optimized version of the code
2. Explanation of optimizations made
3. Performance improvements achieved
4. Best practices applied

Optimized code:
"
  )
}

pub fn chat_request(code: &str, question: &str) -> String {
  let code = if code.is_empty() {
    "No code in editor"
  } else {
    code
  };
  format!(
    "Current code in editor:
{code}

User question: {question}

Please provide a helpful response considering the current code context.
"
  )
}

/// Output log text for a successful response.
pub fn format_response(kind: CommandKind, response: &str, query: &str) -> String {
  match kind {
    CommandKind::Generate => format!("Code generated successfully!\n\nPrompt: {query}"),
    CommandKind::Explain => format!("Code Explanation:\n\n{response}"),
    CommandKind::Fix => format!("Code Analysis and Fixes:\n\n{response}"),
    CommandKind::Optimize => format!("Code Optimization:\n\n{response}"),
    CommandKind::Chat => format!("AI: {response}"),
  }
}

/// Output log text for a failed request. Always a single line.
pub fn format_error(kind: CommandKind, error: &dyn fmt::Display) -> String {
  let error = error.to_string().replace(['\r', '\n'], " ");
  match kind {
    CommandKind::Generate => format!("Error generating code: {error}"),
    CommandKind::Explain => format!("Error explaining code: {error}"),
    CommandKind::Fix => format!("Error fixing code: {error}"),
    CommandKind::Optimize => format!("Error optimizing code: {error}"),
    CommandKind::Chat => format!("Error: {error}"),
  }
}

/// Interior of the first closed fenced block in `response`, trimmed, with a
/// leading info string (`python`, `rust`, ...) removed.
pub fn fenced_block(response: &str) -> Option<&str> {
  let open = response.find(FENCE)?;
  let after = &response[open + FENCE.len()..];
  let close = after.find(FENCE)?;
  let mut interior = &after[..close];
  if let Some((first, rest)) = interior.split_once('\n')
    && is_info_string(first.trim_end_matches('\r'))
  {
    interior = rest;
  }
  Some(interior.trim())
}

/// What the generate command inserts into the document: the first fenced
/// block when there is one, the whole response otherwise.
pub fn extract_code(response: &str) -> &str {
  fenced_block(response).unwrap_or(response)
}

fn is_info_string(line: &str) -> bool {
  line
    .chars()
    .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '+' | '.' | '#'))
}
