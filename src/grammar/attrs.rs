//! The command attribute vocabulary.

/// Attributes a command marker may carry. Anything outside this set fails
/// validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandAttr {
    Target,
    Swap,
    Select,
    Redirect,
    Refresh,
    Location,
    PushUrl,
    ReplaceUrl,
    Trigger,
    TriggerAfterSwap,
    TriggerAfterSettle,
}

impl CommandAttr {
    pub const ALL: [CommandAttr; 11] = [
        CommandAttr::Target,
        CommandAttr::Swap,
        CommandAttr::Select,
        CommandAttr::Redirect,
        CommandAttr::Refresh,
        CommandAttr::Location,
        CommandAttr::PushUrl,
        CommandAttr::ReplaceUrl,
        CommandAttr::Trigger,
        CommandAttr::TriggerAfterSwap,
        CommandAttr::TriggerAfterSettle,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CommandAttr::Target => "target",
            CommandAttr::Swap => "swap",
            CommandAttr::Select => "select",
            CommandAttr::Redirect => "redirect",
            CommandAttr::Refresh => "refresh",
            CommandAttr::Location => "location",
            CommandAttr::PushUrl => "push-url",
            CommandAttr::ReplaceUrl => "replace-url",
            CommandAttr::Trigger => "trigger",
            CommandAttr::TriggerAfterSwap => "trigger-after-swap",
            CommandAttr::TriggerAfterSettle => "trigger-after-settle",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|attr| attr.name() == name)
    }
}
