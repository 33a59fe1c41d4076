use crate::cli::core::{CommandResult, ShellContext};

pub type CommandHandler = fn(&mut ShellContext, &[&str]) -> CommandResult;

/// One dispatchable shell command, grouped under a help section.
pub struct CommandEntry {
    pub name: &'static str,
    pub section: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub handler: CommandHandler,
}

impl CommandEntry {
    pub const fn new(
        name: &'static str,
        section: &'static str,
        description: &'static str,
        usage: &'static str,
        handler: CommandHandler,
    ) -> Self {
        Self {
            name,
            section,
            description,
            usage,
            handler,
        }
    }
}

/// Command table in registration order. The command set is small and fixed,
/// so lookups scan the list directly.
#[derive(Default)]
pub struct CommandRegistry {
    entries: Vec<CommandEntry>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a command, replacing any earlier entry with the same name in
    /// place.
    pub fn register(&mut self, entry: CommandEntry) {
        match self.entries.iter_mut().find(|existing| existing.name == entry.name) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn get(&self, name: &str) -> Option<&CommandEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    pub fn handler(&self, name: &str) -> Option<CommandHandler> {
        self.get(name).map(|entry| entry.handler)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|entry| entry.name)
    }

    /// Entries grouped by section, sections in first-appearance order.
    pub fn sections(&self) -> Vec<(&'static str, Vec<&CommandEntry>)> {
        let mut sections: Vec<(&'static str, Vec<&CommandEntry>)> = Vec::new();
        for entry in &self.entries {
            match sections.iter_mut().find(|(name, _)| *name == entry.section) {
                Some((_, list)) => list.push(entry),
                None => sections.push((entry.section, vec![entry])),
            }
        }
        sections
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_ctx: &mut ShellContext, _args: &[&str]) -> CommandResult {
        Ok(())
    }

    #[test]
    fn registration_replaces_by_name_and_groups_sections() {
        let mut registry = CommandRegistry::new();
        registry.register(CommandEntry::new("login", "session", "a", "login", noop));
        registry.register(CommandEntry::new("new-form", "forms", "b", "new-form", noop));
        registry.register(CommandEntry::new("logout", "session", "c", "logout", noop));
        registry.register(CommandEntry::new("login", "session", "d", "login", noop));

        assert_eq!(registry.names().count(), 3);
        assert_eq!(registry.get("login").map(|entry| entry.description), Some("d"));

        let sections = registry.sections();
        assert_eq!(sections[0].0, "session");
        assert_eq!(sections[0].1.len(), 2);
        assert_eq!(sections[1].0, "forms");
    }
}
