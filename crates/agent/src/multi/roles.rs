//! Role templates.
//!
//! A role is a named prompt plus a tool allowlist. Coordinators turn each
//! role into one live [`ReactAgent`](crate::react::ReactAgent).

use serde::{Deserialize, Serialize};
use troupe_config::RoleConfig;
use troupe_core::error::CoordinationError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRole {
    pub name: String,
    pub description: String,
    pub system_prompt: String,
    /// Names of the tools the role may call.
    #[serde(default)]
    pub tools: Vec<String>,
}

impl AgentRole {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            system_prompt: system_prompt.into(),
            tools: Vec::new(),
        }
    }

    pub fn with_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tools = tools.into_iter().map(Into::into).collect();
        self
    }
}

impl From<&RoleConfig> for AgentRole {
    fn from(config: &RoleConfig) -> Self {
        AgentRole::new(&config.name, &config.description, &config.system_prompt)
            .with_tools(config.tools.iter().cloned())
    }
}

/// The built-in roles, in catalogue order.
pub fn builtin_roles() -> Vec<AgentRole> {
    vec![
        AgentRole::new(
            "researcher",
            "Information gatherer who searches for and organizes material",
            "You are a professional researcher. Your job:\n\
             1. Use the search tools to collect information relevant to the task\n\
             2. Organize and summarize what you find\n\
             3. Extract the key facts and figures\n\
             4. Present the findings in a clear, structured format\n\n\
             Only report verified information. Never invent data.",
        )
        .with_tools(["search", "weather"]),
        AgentRole::new(
            "analyst",
            "Data analyst who examines material and distills insights",
            "You are a professional data analyst. Your job:\n\
             1. Analyze the data and information you are given\n\
             2. Use the calculator for any numeric work\n\
             3. Distill the key points and insights\n\
             4. Draw conclusions backed by the data\n\n\
             Keep the analysis logical and every conclusion supported.",
        )
        .with_tools(["calculator"]),
        AgentRole::new(
            "writer",
            "Writer who produces structured reports and articles",
            "You are a professional technical writer. Your job:\n\
             1. Write a report from the research and analysis you are given\n\
             2. Use a clear structure with headings, paragraphs, and lists\n\
             3. Keep the content accurate and the argument coherent\n\
             4. Write concisely and professionally\n\n\
             Write only from the material provided. Add nothing unverified.",
        ),
        AgentRole::new(
            "reviewer",
            "Reviewer who audits and improves other agents' output",
            "You are a rigorous reviewer. Your job:\n\
             1. Check the content you are given for accuracy and completeness\n\
             2. Point out logical gaps, factual errors, and omissions\n\
             3. Give concrete suggestions for improvement\n\
             4. Rate the overall quality from 1 to 10\n\n\
             Be objective and make every suggestion actionable.",
        ),
        AgentRole::new(
            "python_expert",
            "Python specialist",
            "You are a senior Python developer. Your job:\n\
             1. Answer technical questions about Python\n\
             2. Analyze where Python shines and where it fits\n\
             3. Recommend best practices and code approaches\n\n\
             Argue with technical depth and precision.",
        )
        .with_tools(["search"]),
        AgentRole::new(
            "go_expert",
            "Go specialist",
            "You are a senior Go developer. Your job:\n\
             1. Answer technical questions about Go\n\
             2. Analyze where Go shines and where it fits\n\
             3. Recommend best practices and code approaches\n\n\
             Argue with technical depth and precision.",
        )
        .with_tools(["search"]),
    ]
}

/// Look up a built-in role by name.
pub fn get_role(name: &str) -> Result<AgentRole, CoordinationError> {
    RoleCatalog::builtin().get(name)
}

/// An ordered set of roles: the built-ins plus any custom roles.
#[derive(Debug, Clone)]
pub struct RoleCatalog {
    roles: Vec<AgentRole>,
}

impl RoleCatalog {
    pub fn builtin() -> Self {
        Self {
            roles: builtin_roles(),
        }
    }

    /// Add `role`, replacing any role of the same name in place.
    pub fn insert(&mut self, role: AgentRole) {
        match self.roles.iter_mut().find(|r| r.name == role.name) {
            Some(existing) => *existing = role,
            None => self.roles.push(role),
        }
    }

    /// Built-ins extended or overridden by configured roles.
    pub fn with_configured(configs: &[RoleConfig]) -> Self {
        let mut catalog = Self::builtin();
        for config in configs {
            catalog.insert(AgentRole::from(config));
        }
        catalog
    }

    pub fn get(&self, name: &str) -> Result<AgentRole, CoordinationError> {
        self.roles
            .iter()
            .find(|r| r.name == name)
            .cloned()
            .ok_or_else(|| CoordinationError::UnknownRole {
                name: name.to_string(),
                available: self.names(),
            })
    }

    pub fn names(&self) -> Vec<String> {
        self.roles.iter().map(|r| r.name.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AgentRole> {
        self.roles.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalogue() {
        let names = RoleCatalog::builtin().names();
        assert_eq!(
            names,
            vec!["researcher", "analyst", "writer", "reviewer", "python_expert", "go_expert"]
        );
    }

    #[test]
    fn builtin_tool_allowlists() {
        assert_eq!(get_role("researcher").unwrap().tools, vec!["search", "weather"]);
        assert_eq!(get_role("analyst").unwrap().tools, vec!["calculator"]);
        assert!(get_role("writer").unwrap().tools.is_empty());
    }

    #[test]
    fn unknown_role_lists_available() {
        let err = get_role("juggler").unwrap_err();
        let text = err.to_string();
        assert!(text.contains("juggler"));
        assert!(text.contains("researcher"));
        assert!(matches!(err, CoordinationError::UnknownRole { ref available, .. } if available.len() == 6));
    }

    #[test]
    fn configured_roles_extend_and_override() {
        let configs = vec![
            RoleConfig {
                name: "critic".into(),
                description: "Finds weaknesses".into(),
                system_prompt: "Be critical.".into(),
                tools: vec!["search".into()],
            },
            RoleConfig {
                name: "writer".into(),
                description: "Poet".into(),
                system_prompt: "Write in verse.".into(),
                tools: vec![],
            },
        ];
        let catalog = RoleCatalog::with_configured(&configs);

        assert_eq!(catalog.names().len(), 7);
        assert_eq!(catalog.names()[2], "writer");
        assert_eq!(catalog.get("writer").unwrap().system_prompt, "Write in verse.");
        assert_eq!(catalog.get("critic").unwrap().tools, vec!["search"]);
    }
}
