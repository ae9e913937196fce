/// Row-count maxima and fan-out knobs for the import pipeline.
///
/// Mirrors the archive's table-size policy: a standard ceiling for ordinary
/// reports and a much higher one for custom-variable tables on ecommerce
/// sites, where product keys legitimately explode the label space.
#[derive(Debug, Clone)]
pub struct ImportConfig {
    pub standard_max_rows: usize,
    pub custom_vars_max_rows: usize,
    pub custom_vars_max_subtable_rows: usize,
    pub ecommerce_max_rows: usize,
    pub custom_variable_slots: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            standard_max_rows: 500,
            custom_vars_max_rows: 1000,
            custom_vars_max_subtable_rows: 1000,
            ecommerce_max_rows: 50_000,
            custom_variable_slots: 5,
        }
    }
}

impl ImportConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            standard_max_rows: env_usize("HARVEST_MAX_ROWS_STANDARD", defaults.standard_max_rows),
            custom_vars_max_rows: env_usize(
                "HARVEST_MAX_ROWS_CUSTOM_VARIABLES",
                defaults.custom_vars_max_rows,
            ),
            custom_vars_max_subtable_rows: env_usize(
                "HARVEST_MAX_ROWS_SUBTABLE_CUSTOM_VARIABLES",
                defaults.custom_vars_max_subtable_rows,
            ),
            ecommerce_max_rows: env_usize("HARVEST_MAX_ROWS_ECOMMERCE", defaults.ecommerce_max_rows),
            custom_variable_slots: env_usize(
                "HARVEST_CUSTOM_VARIABLE_SLOTS",
                defaults.custom_variable_slots,
            ),
        }
    }

    /// Level-zero and subtable maxima for the custom-variables record.
    /// Ecommerce sites get the higher ceiling at both levels.
    pub fn custom_variable_maximums(&self, ecommerce: bool) -> (usize, usize) {
        if ecommerce {
            (self.ecommerce_max_rows, self.ecommerce_max_rows)
        } else {
            (self.custom_vars_max_rows, self.custom_vars_max_subtable_rows)
        }
    }
}

fn env_usize(name: &str, default: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
