use std::{env, str::FromStr};

/// Token-bucket settings for one route group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitRule {
    pub per_second: u64,
    pub burst_size: u32,
}

impl RateLimitRule {
    const fn new(per_second: u64, burst_size: u32) -> Self {
        Self {
            per_second,
            burst_size,
        }
    }
}

/// `per:burst`, both non-zero.
impl FromStr for RateLimitRule {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (per, burst) = raw
            .trim()
            .split_once(':')
            .ok_or_else(|| format!("invalid rule '{}', expected per:burst", raw.trim()))?;

        let per_second = per
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| {
                format!(
                    "requests per second must be a positive integer, got '{}'",
                    per.trim()
                )
            })?;
        let burst_size = burst
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| format!("burst must be a positive integer, got '{}'", burst.trim()))?;

        Ok(Self::new(per_second, burst_size))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RouteGroup {
    Public,
    Submit,
    Admin,
}

impl FromStr for RouteGroup {
    type Err = String;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_lowercase().as_str() {
            "public" => Ok(Self::Public),
            "submit" => Ok(Self::Submit),
            "admin" => Ok(Self::Admin),
            other => Err(format!(
                "unknown group '{}', expected public, submit or admin",
                other
            )),
        }
    }
}

/// Rate limits for the citizen lookups, the anonymous submissions and the
/// operator routes.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub public_read: RateLimitRule,
    pub submit: RateLimitRule,
    pub admin: RateLimitRule,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            public_read: RateLimitRule::new(30, 60),
            submit: RateLimitRule::new(2, 10),
            admin: RateLimitRule::new(10, 20),
        }
    }
}

impl RateLimitConfig {
    /// Reads `RATE_LIMIT_ENABLED` and `RATE_LIMIT_CONFIG`.
    ///
    /// `RATE_LIMIT_CONFIG` is either one `per:burst` rule for every group or a
    /// list such as `public=30:60,submit=2:10`. An invalid value is logged and
    /// the defaults stay in force.
    pub fn from_env() -> Self {
        let defaults = Self {
            enabled: super::parse_bool_env("RATE_LIMIT_ENABLED", true),
            ..Self::default()
        };

        match env::var("RATE_LIMIT_CONFIG") {
            Ok(raw) => defaults.with_overrides(&raw).unwrap_or_else(|err| {
                tracing::warn!("Ignoring RATE_LIMIT_CONFIG '{}': {}", raw, err);
                defaults
            }),
            Err(_) => defaults,
        }
    }

    fn with_overrides(mut self, raw: &str) -> Result<Self, String> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err("empty value".to_string());
        }

        if !raw.contains('=') {
            let rule: RateLimitRule = raw.parse()?;
            self.public_read = rule;
            self.submit = rule;
            self.admin = rule;
            return Ok(self);
        }

        for item in raw.split(',').map(str::trim).filter(|i| !i.is_empty()) {
            let (group, rule) = item
                .split_once('=')
                .ok_or_else(|| format!("invalid item '{}', expected group=per:burst", item))?;
            *self.rule_mut(group.parse()?) = rule.parse()?;
        }

        Ok(self)
    }

    fn rule_mut(&mut self, group: RouteGroup) -> &mut RateLimitRule {
        match group {
            RouteGroup::Public => &mut self.public_read,
            RouteGroup::Submit => &mut self.submit,
            RouteGroup::Admin => &mut self.admin,
        }
    }
}
