use super::{ConfigError, Settings, offset_from_secs};

const MAX_NICE_LEVEL: i32 = 19;

impl Settings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let offset = offset_from_secs(self.offset_secs)?;
        if offset.num_seconds().abs() >= self.interval.min_length_secs() {
            tracing::warn!(
                "Offset of {}s may reach a whole {} period; boundaries beyond one period are not corrected",
                self.offset_secs,
                self.interval
            );
        }

        if !(0..=MAX_NICE_LEVEL).contains(&self.nice_level) {
            return Err(ConfigError::InvalidConfig(format!(
                "Invalid compress nice level {} (expected 0..={MAX_NICE_LEVEL})",
                self.nice_level
            )));
        }

        if self.compress_after > 0 && self.compress_program.as_os_str().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "Compress program cannot be empty while compression is enabled".to_string(),
            ));
        }

        if self.compress_suffix.is_empty() {
            return Err(ConfigError::InvalidConfig(
                "Compress suffix cannot be empty".to_string(),
            ));
        }

        if self.tick_interval_secs == 0 {
            return Err(ConfigError::InvalidConfig(
                "Tick interval must be greater than 0".to_string(),
            ));
        }

        for spec in &self.log_directives {
            if spec.name.trim().is_empty() {
                return Err(ConfigError::InvalidConfig(
                    "Log directive name cannot be empty".to_string(),
                ));
            }
            if spec.position == 0 {
                return Err(ConfigError::InvalidConfig(format!(
                    "Invalid position for directive {}",
                    spec.name
                )));
            }
        }

        Ok(())
    }
}
