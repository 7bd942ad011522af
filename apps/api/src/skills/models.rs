use serde::{Deserialize, Serialize};

/// Type label the taxonomy uses for specialized (hard) skills.
pub const SPECIALIZED_SKILL: &str = "Specialized Skill";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractSkillsRequest<'a> {
    pub text: &'a str,
    pub confidence_threshold: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractSkillsResponse {
    #[serde(default)]
    pub data: Vec<ExtractedSkill>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractedSkill {
    pub skill: Skill,
    pub confidence: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Skill {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub skill_type: SkillType,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SkillType {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

impl SkillType {
    pub fn is_specialized(&self) -> bool {
        self.name == SPECIALIZED_SKILL
    }
}

impl ExtractSkillsResponse {
    /// Names of skills whose type matches `specialized`, in response order.
    pub fn names_where_specialized(&self, specialized: bool) -> Vec<String> {
        self.data
            .iter()
            .filter(|d| d.skill.skill_type.is_specialized() == specialized)
            .map(|d| d.skill.name.clone())
            .collect()
    }
}
