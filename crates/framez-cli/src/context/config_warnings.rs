use framez_config::FramezConfig;

const SECTIONS: [&str; 4] = ["BACKEND", "STORAGE", "SESSION", "GENERAL"];

/// Emit warnings for likely mistyped env var keys that silently fell back to defaults.
pub fn warn_unconfigured(config: &FramezConfig) {
    for warning in collect_unconfigured_warnings(config, std::env::vars()) {
        tracing::warn!("{warning}");
    }
}

fn collect_unconfigured_warnings<I>(config: &FramezConfig, env: I) -> Vec<String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let env_keys = env
        .into_iter()
        .map(|(key, _)| key)
        .filter(|key| key.starts_with("FRAMEZ_"))
        .collect::<Vec<_>>();

    let mut warnings = Vec::new();

    for section in SECTIONS {
        let single = format!("FRAMEZ_{section}_");
        let double = format!("FRAMEZ_{section}__");
        if let Some(key) = env_keys
            .iter()
            .find(|key| key.starts_with(&single) && !key.starts_with(&double))
        {
            warnings.push(format!(
                "{key} is ignored. Use double underscores between section and field (example: {double}{}).",
                key.trim_start_matches(&single)
            ));
        }
    }

    if !config.backend.is_configured() && env_keys.iter().any(|k| k.starts_with("FRAMEZ_BACKEND__")) {
        warnings.push(
            "Backend config is incomplete: both FRAMEZ_BACKEND__URL and FRAMEZ_BACKEND__ANON_KEY are required."
                .to_string(),
        );
    }

    warnings
}
