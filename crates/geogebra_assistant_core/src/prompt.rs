//! crates/geogebra_assistant_core/src/prompt.rs
//!
//! Builds the conversation sent to the LLM when a whole answer has to be
//! regenerated after a GeoGebra command failed.
//!
//! The message order is part of the contract: baseline rules first, the user's
//! query always last, and the most specific reminders directly before it.

use crate::domain::Message;

/// How many retrieved commands are offered to the model.
pub const RELATED_COMMANDS_TOP_K: usize = 5;

const DEFAULT_COMMAND_PROMPT: &str = r#"You are a GeoGebra command generator. When the user describes a figure, explain every construction step and give the GeoGebra commands that build it.
- Number the steps as 1. 2. 3. 4. and put each step on its own line.
- Explain your reasoning for coordinates, lengths and angles.
- Put all commands in a single code block, one command per line, for example:
```
A(0,0)
B(1,0)
C(0.5, sqrt(3)/2)
Polygon(A, B, C)
```
- Do not write anything except commands inside the code block, and never use ``` inside the step descriptions."#;

const DEFAULT_GEOGEBRA_RULES: &str = r#"GeoGebra syntax rules:
- Always use the English command names (Circle, Line, Segment, Polygon, Sphere, Cylinder, ...).
- Arguments go inside parentheses and are separated by commas, e.g. Circle(A, 3). Never leave a trailing comma.
- Points are written as (x, y) in the plane and (x, y, z) in space; use 3D commands for solids.
- Every object must be defined before another command refers to it.
- Use a dot as decimal separator and built-in functions such as sqrt(), sin(), cos() and pi."#;

const DEFAULT_NAMING_RULES: &str = r#"Object naming rules:
- Name points with capital letters, optionally followed by an index (A, B, P_1).
- Name lines, segments, circles and functions with lowercase letters (f, g, c, s_1).
- Never reuse a name for two different objects, and never use reserved names such as x, y, z, e, i or pi.
- Names must not contain spaces."#;

const SYNTAX_REMINDER: &str = r#"Please ensure your commands are syntactically correct. The commands will be validated in a GeoGebra environment.
Use proper syntax for GeoGebra commands (e.g., Circle(A, 3) or Line(A, B))."#;

const REFERENCE_FORMAT_REMINDER: &str = r#"At the end, you must display all the commands which the system provided and specify the referenced commands in the following format:

---
Given Commands:
1. [Command Name] - [Syntax]
2. [Command Name] - [Syntax]
3. [Command Name] - [Syntax]
4. [Command Name] - [Syntax]
5. [Command Name] - [Syntax]
Referenced Commands:
1. [Command Name] - [Syntax] - [Reason for choosing this command]
2. [Command Name] - [Syntax] - [Reason for choosing this command]
3. [Command Name] - [Syntax] - [Reason for choosing this command]
---"#;

/// The three domain-rule blocks that open every conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaselinePrompts {
    pub command: String,
    pub geogebra_rules: String,
    pub naming_rules: String,
}

impl Default for BaselinePrompts {
    fn default() -> Self {
        Self {
            command: DEFAULT_COMMAND_PROMPT.to_string(),
            geogebra_rules: DEFAULT_GEOGEBRA_RULES.to_string(),
            naming_rules: DEFAULT_NAMING_RULES.to_string(),
        }
    }
}

impl BaselinePrompts {
    fn messages(&self) -> Vec<Message> {
        vec![
            Message::system(self.command.clone()),
            Message::system(self.geogebra_rules.clone()),
            Message::system(self.naming_rules.clone()),
        ]
    }
}

/// Assembles the full regeneration conversation.
///
/// `related_commands` may hold fewer than [`RELATED_COMMANDS_TOP_K`] entries; missing
/// slots are rendered as empty lines and anything past the limit is ignored. When it is
/// empty, the related-commands block is left out entirely.
pub fn assemble_regeneration_prompt(
    baseline: &BaselinePrompts,
    related_commands: &[String],
    original_query: &str,
    failed_command: &str,
    error_msg: &str,
) -> Vec<Message> {
    let mut messages = baseline.messages();

    if !related_commands.is_empty() {
        messages.push(Message::system(related_commands_prompt(related_commands)));
    }
    messages.push(Message::system(failed_command_prompt(failed_command, error_msg)));
    messages.push(Message::system(SYNTAX_REMINDER));
    messages.push(Message::system(REFERENCE_FORMAT_REMINDER));

    // Must stay last.
    messages.push(Message::user(original_query));
    messages
}

fn related_commands_prompt(related_commands: &[String]) -> String {
    let slots = (0..RELATED_COMMANDS_TOP_K)
        .map(|i| related_commands.get(i).map(String::as_str).unwrap_or(""))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"[IMPORTANT] RELEVANT GEOGEBRA COMMANDS FOR THIS QUERY:
(Commands are listed in order of relevance, most relevant first)
{slots}

YOU MUST EXPLICITLY state which of these commands you are using in your response.
YOU MUST include the exact syntax of the commands you use.
YOU MUST explain why you chose these specific commands.

If none of these commands are suitable, explain why and suggest alternatives."#
    )
}

fn failed_command_prompt(failed_command: &str, error_msg: &str) -> String {
    format!(
        r#"[CRITICAL] The following command failed with an error:
- Command: {failed_command}
- Error: {error_msg}

Please revise your entire explanation and command sequence to fix this issue.
Analyze why the command failed and provide a corrected approach.
Make sure all commands are syntactically correct according to GeoGebra's requirements."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;

    fn commands(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("Command{i}( <Arg> )")).collect()
    }

    #[test]
    fn user_query_is_the_single_last_message() {
        let query = "  draw a circle of radius 3\n";
        let messages = assemble_regeneration_prompt(
            &BaselinePrompts::default(),
            &commands(5),
            query,
            "Circle(A,3,)",
            "syntax error",
        );

        let last = messages.last().unwrap();
        assert_eq!(last.role, Role::User);
        assert_eq!(last.content, query);
        assert_eq!(messages.iter().filter(|m| m.role == Role::User).count(), 1);
    }

    #[test]
    fn baseline_blocks_open_the_conversation_in_order() {
        let baseline = BaselinePrompts {
            command: "first".into(),
            geogebra_rules: "second".into(),
            naming_rules: "third".into(),
        };
        let messages = assemble_regeneration_prompt(&baseline, &[], "q", "c", "e");

        let heads: Vec<&str> = messages[..3].iter().map(|m| m.content.as_str()).collect();
        assert_eq!(heads, ["first", "second", "third"]);
        assert!(messages[..3].iter().all(|m| m.role == Role::System));
    }

    #[test]
    fn full_structure_with_related_commands() {
        let messages = assemble_regeneration_prompt(
            &BaselinePrompts::default(),
            &commands(5),
            "q",
            "Circle(A,3,)",
            "syntax error",
        );

        assert_eq!(messages.len(), 8);
        assert!(messages[3].content.contains("RELEVANT GEOGEBRA COMMANDS"));
        assert!(messages[4].content.contains("- Command: Circle(A,3,)"));
        assert!(messages[4].content.contains("- Error: syntax error"));
        assert!(messages[5].content.contains("Circle(A, 3)"));
        assert!(messages[6].content.contains("Given Commands:"));
        assert!(messages[6].content.contains("Referenced Commands:"));
        assert!(messages[6].content.starts_with("At the end"));
        assert!(messages[6].content.ends_with("---"));
    }

    #[test]
    fn related_block_is_skipped_when_nothing_was_retrieved() {
        let messages =
            assemble_regeneration_prompt(&BaselinePrompts::default(), &[], "q", "c", "e");

        assert_eq!(messages.len(), 7);
        assert!(messages
            .iter()
            .all(|m| !m.content.contains("RELEVANT GEOGEBRA COMMANDS")));
        assert!(messages[3].content.starts_with("[CRITICAL]"));
    }

    #[test]
    fn fewer_than_five_commands_leave_empty_slots() {
        let messages = assemble_regeneration_prompt(
            &BaselinePrompts::default(),
            &commands(2),
            "q",
            "c",
            "e",
        );
        let related = &messages[3].content;

        assert!(related.contains("Command1( <Arg> )\nCommand2( <Arg> )\n\n\n\n"));
    }

    #[test]
    fn commands_beyond_the_limit_are_dropped() {
        let messages = assemble_regeneration_prompt(
            &BaselinePrompts::default(),
            &commands(7),
            "q",
            "c",
            "e",
        );
        let related = &messages[3].content;

        assert!(related.contains("Command5( <Arg> )"));
        assert!(!related.contains("Command6"));
        assert!(!related.contains("Command7"));
    }
}
