//! Lenient readers for mask section values.
//!
//! Menu files are hand-written, so numbers may arrive as strings and flags as
//! anything. Malformed values fall back to the documented default instead of
//! failing the whole menu.

use roster_types::{
    AnimatedSettings, DEFAULT_MILLIS_PER_TICK, ValueListSettings, viewer_ttl_millis,
};

use crate::template::{Template, TemplateMap, string_list};
use crate::value_list::ValueListTemplate;

/// First value present under any of `keys`, in order.
pub fn get_if_found<'a>(section: &'a TemplateMap, keys: &[&str]) -> Option<&'a Template> {
    keys.iter().find_map(|key| section.get(*key))
}

/// Integer from an integer, a float (truncated) or a numeric string.
pub fn number(value: &Template) -> Option<i64> {
    match value {
        Template::Integer(n) => Some(*n),
        Template::Float(f) if f.is_finite() => Some(*f as i64),
        Template::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64))
        }
        _ => None,
    }
}

/// `true` for a boolean true or the string "true" in any case.
pub fn flag(value: &Template) -> bool {
    match value {
        Template::Boolean(b) => *b,
        Template::String(s) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    }
}

pub fn flag_or(section: &TemplateMap, keys: &[&str], default: bool) -> bool {
    get_if_found(section, keys).map(flag).unwrap_or(default)
}

pub fn lines(section: &TemplateMap, keys: &[&str]) -> Vec<String> {
    get_if_found(section, keys).map(string_list).unwrap_or_default()
}

/// Menu-wide tick length, `millis-per-tick` at the top level.
pub fn millis_per_tick(menu: &TemplateMap) -> u64 {
    get_if_found(menu, &["millis-per-tick"])
        .and_then(number)
        .filter(|n| *n > 0)
        .map(|n| n as u64)
        .unwrap_or(DEFAULT_MILLIS_PER_TICK)
}

pub fn value_list_settings(section: &TemplateMap, millis_per_tick: u64) -> ValueListSettings {
    let value_update_ticks = get_if_found(section, &["value-update-ticks", "value-update"])
        .and_then(number)
        .map(|n| n.max(1) as u64)
        .unwrap_or(ValueListSettings::DEFAULT_VALUE_UPDATE_TICKS);
    let viewer_update_millis = get_if_found(section, &["viewer-update-ticks", "viewer-update"])
        .and_then(number)
        .map(|ticks| viewer_ttl_millis(ticks, millis_per_tick))
        .unwrap_or(ValueListSettings::DEFAULT_VIEWER_UPDATE_MILLIS);
    let value_evict_cycles = get_if_found(section, &["value-evict-cycles"])
        .and_then(number)
        .map(|n| n.max(0) as u64)
        .unwrap_or(0);

    ValueListSettings {
        value_update_ticks,
        viewer_update_millis,
        run_async: flag_or(section, &["async"], true),
        value_evict_cycles,
        millis_per_tick,
    }
}

pub fn value_list_template(section: &TemplateMap) -> ValueListTemplate {
    let button = get_if_found(section, &["template", "button"])
        .and_then(Template::as_table)
        .cloned()
        .unwrap_or_default();
    ValueListTemplate {
        button,
        viewer_condition: lines(section, &["viewer-condition"]),
    }
}

pub fn animated_settings(section: &TemplateMap) -> AnimatedSettings {
    let update_ticks = get_if_found(section, &["update"])
        .and_then(number)
        .filter(|n| *n > 0)
        .map(|n| n as u64)
        .unwrap_or(0);
    AnimatedSettings {
        update_ticks,
        run_async: flag_or(section, &["async"], true),
    }
}
