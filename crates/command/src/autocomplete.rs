use serde::Serialize;

use crate::COMMAND_TRIGGER;
use crate::handler::Subcommand;

/// One node of the autocomplete tree shown while typing the command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AutocompleteData {
    pub trigger: String,
    pub hint: String,
    pub help_text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sub_commands: Vec<AutocompleteData>,
}

impl AutocompleteData {
    fn leaf(trigger: &str, help_text: &str) -> Self {
        Self {
            trigger: trigger.to_owned(),
            hint: String::new(),
            help_text: help_text.to_owned(),
            sub_commands: Vec::new(),
        }
    }
}

/// What the host platform needs to register the command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandRegistration {
    pub trigger: String,
    pub auto_complete: bool,
    pub auto_complete_desc: String,
    pub auto_complete_hint: String,
    pub autocomplete_data: AutocompleteData,
}

pub fn registration() -> CommandRegistration {
    CommandRegistration {
        trigger: COMMAND_TRIGGER.to_owned(),
        auto_complete: true,
        auto_complete_desc: "PagerDuty integration".to_owned(),
        auto_complete_hint: "[help|schedules|oncall]".to_owned(),
        autocomplete_data: AutocompleteData {
            trigger: COMMAND_TRIGGER.to_owned(),
            hint: "[subcommand]".to_owned(),
            help_text: "Available subcommands: help, schedules, oncall".to_owned(),
            sub_commands: Subcommand::ALL
                .iter()
                .map(|sub| AutocompleteData::leaf(sub.name(), sub.description()))
                .collect(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_every_subcommand() {
        let reg = registration();
        assert_eq!(reg.trigger, "pagerduty");
        let triggers: Vec<_> = reg
            .autocomplete_data
            .sub_commands
            .iter()
            .map(|s| s.trigger.as_str())
            .collect();
        assert_eq!(triggers, vec!["help", "schedules", "oncall"]);
    }

    #[test]
    fn leaves_omit_empty_children() {
        let json = serde_json::to_value(registration()).unwrap();
        let first = &json["autocomplete_data"]["sub_commands"][0];
        assert_eq!(first["help_text"], "Shows this help message");
        assert!(first.get("sub_commands").is_none());
    }
}
