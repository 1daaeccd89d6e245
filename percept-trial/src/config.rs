use crate::params::TrialParams;

/// Response and timing rules for one presentation.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub trial_id: usize,
    /// Accepted keys; `None` accepts any key.
    pub choices: Option<Vec<String>>,
    /// Time from onset after which the trial ends without a response.
    pub trial_duration_ms: Option<u64>,
    /// Time from onset after which the stimulus is hidden.
    pub stimulus_duration_ms: Option<u64>,
    pub response_ends_trial: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            trial_id: 0,
            choices: None,
            trial_duration_ms: None,
            stimulus_duration_ms: None,
            response_ends_trial: true,
        }
    }
}

impl From<&TrialParams> for SessionConfig {
    fn from(params: &TrialParams) -> Self {
        let defaults = Self::default();
        Self {
            trial_id: params.trial_id.unwrap_or(defaults.trial_id),
            choices: params.choices.clone().filter(|c| !c.is_empty()),
            trial_duration_ms: params.trial_duration,
            stimulus_duration_ms: params.stimulus_duration,
            response_ends_trial: params.response_ends_trial.unwrap_or(defaults.response_ends_trial),
        }
    }
}

impl SessionConfig {
    pub fn accepts(&self, key: &str) -> bool {
        self.choices
            .as_ref()
            .is_none_or(|choices| choices.iter().any(|c| c == key))
    }
}
