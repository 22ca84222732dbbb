//! Trigger grammar: `<event> [modifier ...]`, modifiers space-separated.
//!
//! A modifier token is either a bare flag (`once`, `prevent`, `capture`,
//! `passive`) or `name:value` where `poll`, `delay`, `throttle`, `debounce`
//! take a time interval and `from` takes a selector string. Unrecognized
//! tokens are dropped, never an error: trigger strings are written by HTML
//! authors and partial directives must degrade gracefully.

/// Parsed `oyc-trigger` value. The default when the attribute is absent is
/// supplied by the caller (`click` with an empty modifier set).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TriggerDescriptor {
    pub event: String,
    pub modifiers: ModifierSet,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModifierSet {
    pub once: bool,
    pub prevent: bool,
    pub capture: bool,
    pub passive: bool,
    /// Time intervals in milliseconds.
    pub poll: Option<u64>,
    pub delay: Option<u64>,
    pub throttle: Option<u64>,
    pub debounce: Option<u64>,
    /// Selector naming the element events are listened on instead of the
    /// directive element itself. Parsed, not yet honored by the binder.
    pub from: Option<String>,
}

impl ModifierSet {
    pub fn is_empty(&self) -> bool {
        *self == ModifierSet::default()
    }
}

/// Convert a time interval string (`150ms`, `2s`, `1m`) to milliseconds.
///
/// Any other unit, a missing unit, or a malformed value yields `None` and a
/// non-fatal diagnostic.
pub fn parse_interval(time: &str) -> Option<u64> {
    let digits_end = time
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(time.len());
    let (value, unit) = time.split_at(digits_end);
    let Ok(value) = value.parse::<f64>() else {
        log::warn!(target: "oyc.trigger", "invalid time interval: {time:?}");
        return None;
    };
    let scale = match unit {
        "ms" => 1.0,
        "s" => 1000.0,
        "m" => 60000.0,
        _ => {
            log::warn!(target: "oyc.trigger", "invalid time interval: {time:?}");
            return None;
        }
    };
    Some((value * scale) as u64)
}

/// Parse a trigger string. Empty input means "no trigger attribute": the
/// caller falls back to its default descriptor.
///
/// Side-effect-free and idempotent: equal inputs parse to equal descriptors.
pub fn parse_trigger(trigger: &str) -> Option<TriggerDescriptor> {
    let mut parts = trigger.split_ascii_whitespace();
    let event = parts.next()?.to_string();
    let mut modifiers = ModifierSet::default();

    for token in parts {
        match token {
            "once" => modifiers.once = true,
            "prevent" => modifiers.prevent = true,
            "capture" => modifiers.capture = true,
            "passive" => modifiers.passive = true,
            _ => {
                let Some((name, value)) = token.split_once(':') else {
                    continue;
                };
                match name {
                    "poll" => modifiers.poll = parse_interval(value),
                    "delay" => modifiers.delay = parse_interval(value),
                    "throttle" => modifiers.throttle = parse_interval(value),
                    "debounce" => modifiers.debounce = parse_interval(value),
                    "from" => modifiers.from = Some(value.to_string()),
                    _ => {}
                }
            }
        }
    }

    Some(TriggerDescriptor { event, modifiers })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_interval_scales_by_unit() {
        assert_eq!(parse_interval("150ms"), Some(150));
        assert_eq!(parse_interval("2s"), Some(2000));
        assert_eq!(parse_interval("1m"), Some(60000));
        assert_eq!(parse_interval("0ms"), Some(0));
    }

    #[test]
    fn parse_interval_rejects_unknown_or_missing_units() {
        assert_eq!(parse_interval("100"), None);
        assert_eq!(parse_interval("100h"), None);
        assert_eq!(parse_interval("fast"), None);
        assert_eq!(parse_interval(""), None);
    }

    #[test]
    fn parse_interval_accepts_fractional_values() {
        assert_eq!(parse_interval("1.5s"), Some(1500));
    }

    #[test]
    fn parse_trigger_empty_input_is_none() {
        assert_eq!(parse_trigger(""), None);
        assert_eq!(parse_trigger("   "), None);
    }

    #[test]
    fn parse_trigger_bare_event() {
        assert_eq!(
            parse_trigger("click"),
            Some(TriggerDescriptor {
                event: "click".to_string(),
                modifiers: ModifierSet::default(),
            })
        );
    }

    #[test]
    fn parse_trigger_flag_modifiers() {
        let descriptor = parse_trigger("click once prevent").expect("descriptor");
        assert_eq!(descriptor.event, "click");
        assert!(descriptor.modifiers.once);
        assert!(descriptor.modifiers.prevent);
        assert!(!descriptor.modifiers.capture);
        assert!(!descriptor.modifiers.passive);
    }

    #[test]
    fn parse_trigger_interval_modifiers() {
        let descriptor = parse_trigger("scroll throttle:100ms").expect("descriptor");
        assert_eq!(descriptor.event, "scroll");
        assert_eq!(descriptor.modifiers.throttle, Some(100));

        let descriptor = parse_trigger("click delay:2s debounce:500ms").expect("descriptor");
        assert_eq!(descriptor.modifiers.delay, Some(2000));
        assert_eq!(descriptor.modifiers.debounce, Some(500));
    }

    #[test]
    fn parse_trigger_captures_from_selector() {
        let descriptor = parse_trigger("keyup from:#search").expect("descriptor");
        assert_eq!(descriptor.modifiers.from.as_deref(), Some("#search"));
    }

    #[test]
    fn parse_trigger_drops_unknown_tokens() {
        let descriptor = parse_trigger("click sideways warp:9 delay:oops").expect("descriptor");
        assert_eq!(descriptor.event, "click");
        assert_eq!(descriptor.modifiers, ModifierSet::default());
    }

    #[test]
    fn parse_trigger_is_idempotent() {
        let raw = "click once delay:250ms";
        assert_eq!(parse_trigger(raw), parse_trigger(raw));
    }

    #[test]
    fn parse_trigger_tolerates_repeated_whitespace() {
        let descriptor = parse_trigger("  click   once  ").expect("descriptor");
        assert_eq!(descriptor.event, "click");
        assert!(descriptor.modifiers.once);
    }
}
