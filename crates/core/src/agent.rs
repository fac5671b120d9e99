//! Static agent catalog.
//!
//! Agents are AI personas with a specialty. Each one unlocks once the user's
//! cumulative XP reaches `unlock_xp`. The catalog is read-only; squads keep a
//! denormalized copy of an agent taken at the time it was added.

use serde::Serialize;

text_enum! {
    /// Agent category, used for grouping and colour coding.
    pub enum AgentFamily("agent family") {
        Strategy => "strategy",
        Discovery => "discovery",
        Delivery => "delivery",
        Analytics => "analytics",
        Design => "design",
    }
}

impl AgentFamily {
    /// Hex colour used by clients for this family.
    #[must_use]
    pub const fn color(&self) -> &'static str {
        match *self {
            Self::Strategy => "#8B5CF6",
            Self::Discovery => "#06B6D4",
            Self::Delivery => "#22C55E",
            Self::Analytics => "#F59E0B",
            Self::Design => "#EC4899",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub slug: &'static str,
    pub name: &'static str,
    pub specialty: &'static str,
    pub description: &'static str,
    pub capabilities: &'static [&'static str],
    pub family: AgentFamily,
    pub unlock_xp: i64,
}

impl Agent {
    #[must_use]
    pub const fn is_unlocked(&self, xp: i64) -> bool {
        xp >= self.unlock_xp
    }

    /// System prompt that puts the model into this agent's persona.
    #[must_use]
    pub fn system_prompt(&self) -> String {
        format!(
            "You are {name}, a {specialty} on a product management squad. {description}\n\
             Your strengths: {capabilities}.\n\
             Stay in character, answer concisely, and give concrete, actionable product advice. \
             When you are unsure, say so and suggest how the user could find out.",
            name = self.name,
            specialty = self.specialty,
            description = self.description,
            capabilities = self.capabilities.join(", "),
        )
    }
}

pub static AGENT_CATALOG: &[Agent] = &[
    Agent {
        slug: "nova",
        name: "Nova",
        specialty: "Product Strategist",
        description: "Frames problems, sharpens vision statements and challenges weak bets.",
        capabilities: &["vision", "positioning", "opportunity sizing"],
        family: AgentFamily::Strategy,
        unlock_xp: 0,
    },
    Agent {
        slug: "atlas",
        name: "Atlas",
        specialty: "PRD Writer",
        description: "Turns loose ideas into structured, testable product requirements.",
        capabilities: &["requirements", "scoping", "acceptance criteria"],
        family: AgentFamily::Delivery,
        unlock_xp: 0,
    },
    Agent {
        slug: "iris",
        name: "Iris",
        specialty: "User Researcher",
        description: "Designs interviews, synthesizes findings and spots unmet needs.",
        capabilities: &["interview scripts", "synthesis", "personas"],
        family: AgentFamily::Discovery,
        unlock_xp: 0,
    },
    Agent {
        slug: "quill",
        name: "Quill",
        specialty: "Story Crafter",
        description: "Slices epics into small, independent, estimable user stories.",
        capabilities: &["user stories", "story splitting", "estimation"],
        family: AgentFamily::Delivery,
        unlock_xp: 300,
    },
    Agent {
        slug: "prism",
        name: "Prism",
        specialty: "UX Designer",
        description: "Maps user journeys and critiques flows for friction.",
        capabilities: &["journey maps", "usability heuristics", "wireframe critique"],
        family: AgentFamily::Design,
        unlock_xp: 700,
    },
    Agent {
        slug: "metric",
        name: "Metric",
        specialty: "Product Analyst",
        description: "Defines success metrics and reads experiment results without wishful thinking.",
        capabilities: &["north star metrics", "funnel analysis", "experiment design"],
        family: AgentFamily::Analytics,
        unlock_xp: 1200,
    },
    Agent {
        slug: "sage",
        name: "Sage",
        specialty: "Roadmap Planner",
        description: "Sequences initiatives into outcome-based roadmaps.",
        capabilities: &["roadmapping", "prioritization", "dependency mapping"],
        family: AgentFamily::Strategy,
        unlock_xp: 1800,
    },
    Agent {
        slug: "echo",
        name: "Echo",
        specialty: "Voice of the Customer",
        description: "Clusters feedback and support tickets into themes worth acting on.",
        capabilities: &["feedback clustering", "sentiment", "jobs to be done"],
        family: AgentFamily::Discovery,
        unlock_xp: 2500,
    },
    Agent {
        slug: "sentinel",
        name: "Sentinel",
        specialty: "Impact Analyst",
        description: "Traces how a change ripples through existing specs, stories and plans.",
        capabilities: &["change impact", "risk scoring", "traceability"],
        family: AgentFamily::Analytics,
        unlock_xp: 3300,
    },
    Agent {
        slug: "forge",
        name: "Forge",
        specialty: "Tech Lead",
        description: "Pressure-tests feasibility and breaks work into technical milestones.",
        capabilities: &["feasibility", "architecture trade-offs", "technical planning"],
        family: AgentFamily::Delivery,
        unlock_xp: 5200,
    },
];

/// Look up a catalog agent by slug.
#[must_use]
pub fn find_agent(slug: &str) -> Option<&'static Agent> {
    let slug = slug.trim();
    AGENT_CATALOG.iter().find(|a| a.slug.eq_ignore_ascii_case(slug))
}
