use super::{ConfigError, Settings};
use std::path::PathBuf;

/// Parse an override if the lookup yields a value; keep the current one otherwise.
fn load_env_var<T, F>(lookup: &F, name: &str, target: &mut T) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    if let Some(value) = lookup(name) {
        *target = value
            .trim()
            .parse()
            .map_err(|e| ConfigError::EnvError(format!("Invalid {name}: {e}")))?;
    }
    Ok(())
}

fn load_env_path_opt<F>(lookup: &F, name: &str, target: &mut Option<PathBuf>)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(name) {
        *target = Some(PathBuf::from(value));
    }
}

impl Settings {
    /// Apply `ROTATOR_*` overrides. `lookup` is `std::env::var` in production.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        load_env_var(&lookup, "ROTATOR_ENABLED", &mut self.enabled)?;
        load_env_var(&lookup, "ROTATOR_INTERVAL", &mut self.interval)?;
        load_env_var(&lookup, "ROTATOR_OFFSET_SECS", &mut self.offset_secs)?;
        load_env_var(&lookup, "ROTATOR_FORMAT", &mut self.format)?;
        load_env_var(&lookup, "ROTATOR_KEEP", &mut self.keep)?;
        load_env_var(&lookup, "ROTATOR_COMPRESS_AFTER", &mut self.compress_after)?;
        load_env_var(&lookup, "ROTATOR_COMPRESS_PROGRAM", &mut self.compress_program)?;
        load_env_var(&lookup, "ROTATOR_COMPRESS_SUFFIX", &mut self.compress_suffix)?;
        load_env_var(&lookup, "ROTATOR_NICE_LEVEL", &mut self.nice_level)?;
        load_env_var(&lookup, "ROTATOR_RESTART_METHOD", &mut self.restart_method)?;
        load_env_var(&lookup, "ROTATOR_TICK_INTERVAL_SECS", &mut self.tick_interval_secs)?;
        load_env_path_opt(&lookup, "ROTATOR_SERVER_ROOT", &mut self.server_root);
        load_env_path_opt(&lookup, "ROTATOR_HOST_CONFIG", &mut self.host_config);
        load_env_path_opt(&lookup, "ROTATOR_HOST_PID_FILE", &mut self.host_pid_file);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Interval, RestartMethod};
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_overrides_replace_file_values() {
        let mut settings = Settings::default();
        settings
            .apply_env_overrides(lookup_from(&[
                ("ROTATOR_ENABLED", "true"),
                ("ROTATOR_INTERVAL", "hourly"),
                ("ROTATOR_OFFSET_SECS", "-900"),
                ("ROTATOR_RESTART_METHOD", "Full"),
                ("ROTATOR_HOST_PID_FILE", "/run/httpd.pid"),
            ]))
            .unwrap();

        assert!(settings.enabled);
        assert_eq!(settings.interval, Interval::Hourly);
        assert_eq!(settings.offset_secs, -900);
        assert_eq!(settings.restart_method, RestartMethod::Full);
        assert_eq!(settings.host_pid_file, Some(PathBuf::from("/run/httpd.pid")));
    }

    #[test]
    fn test_missing_variables_keep_defaults() {
        let mut settings = Settings::default();
        settings.apply_env_overrides(lookup_from(&[])).unwrap();
        assert_eq!(settings.keep, 0);
        assert_eq!(settings.compress_after, 1);
    }

    #[test]
    fn test_invalid_value_reports_variable_name() {
        let mut settings = Settings::default();
        let err = settings
            .apply_env_overrides(lookup_from(&[("ROTATOR_KEEP", "many")]))
            .unwrap_err();
        assert!(err.to_string().contains("ROTATOR_KEEP"));
    }
}
