use crate::error::Result;
use crate::io;
use crate::paths;
use crate::sla::{resolve_sla_times, SlaPolicy, SlaTimes};
use crate::types::Priority;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// SlaConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlaConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub policies: Vec<SlaPolicy>,
}

fn default_version() -> u32 {
    1
}

impl Default for SlaConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            policies: Vec::new(),
        }
    }
}

impl SlaConfig {
    /// Config seeded with one active policy per priority, matching the
    /// built-in table. Written by `sla init` so teams have something to edit.
    pub fn with_default_policies() -> Self {
        let policies = Priority::known()
            .iter()
            .map(|p| {
                let times = resolve_sla_times(p, None);
                SlaPolicy {
                    priority: p.clone(),
                    response_time_hours: times.response_hours,
                    resolution_time_hours: times.resolution_hours,
                    is_active: true,
                }
            })
            .collect();
        Self {
            version: default_version(),
            policies,
        }
    }

    /// Load `.helpdesk/config.yaml`. A missing file is an empty config.
    pub fn load(root: &Path) -> Result<Self> {
        io::read_yaml(&paths::config_path(root))
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        io::write_yaml(&paths::config_path(root), self)
    }

    /// First active policy for `priority`, if any.
    pub fn policy_for(&self, priority: &Priority) -> Option<&SlaPolicy> {
        self.policies
            .iter()
            .find(|p| p.is_active && &p.priority == priority)
    }

    pub fn effective_times(&self, priority: &Priority) -> SlaTimes {
        resolve_sla_times(priority, self.policy_for(priority))
    }

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        let mut seen_active: HashSet<&Priority> = HashSet::new();

        for (i, policy) in self.policies.iter().enumerate() {
            let label = format!("policies[{i}] ({})", policy.priority);

            for (field, hours) in [
                ("response_time_hours", policy.response_time_hours),
                ("resolution_time_hours", policy.resolution_time_hours),
            ] {
                if !hours.is_finite() || hours <= 0.0 {
                    warnings.push(ConfigWarning {
                        level: WarnLevel::Error,
                        message: format!("{label}: {field} must be a positive number, got {hours}"),
                    });
                }
            }

            if !policy.priority.is_recognized() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!(
                        "{label}: unknown priority; tickets with it fall back to medium defaults"
                    ),
                });
            }

            if policy.response_time_hours > policy.resolution_time_hours {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!(
                        "{label}: response window ({}h) is longer than resolution window ({}h)",
                        policy.response_time_hours, policy.resolution_time_hours
                    ),
                });
            }

            if policy.is_active && !seen_active.insert(&policy.priority) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!(
                        "{label}: duplicate active policy for '{}'; the first one wins",
                        policy.priority
                    ),
                });
            }
        }

        for w in &warnings {
            tracing::warn!(level = ?w.level, "{}", w.message);
        }
        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
