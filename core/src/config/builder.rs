use std::sync::Arc;

use roster_types::MaskKind;

use crate::animated::AnimatedMask;
use crate::context::MaskContext;
use crate::gui::MaskRef;
use crate::template::{Template, TemplateError, TemplateMap};
use crate::value_list::{PlayerListDomain, StaticValueDomain, ValueListMask};
use crate::variables::register_current_resolver;

use super::ConfigError;
use super::section::{
    animated_settings, flag_or, get_if_found, lines, millis_per_tick, value_list_settings,
    value_list_template,
};

/// Build every `[mask.<name>]` table of a menu, in file order.
///
/// Masks are returned stopped; the caller decides when to `init` them.
pub fn build_masks(menu: &TemplateMap, ctx: &MaskContext) -> Result<Vec<MaskRef>, ConfigError> {
    let Some(masks) = menu.get("mask").and_then(Template::as_table) else {
        tracing::warn!("menu has no [mask] tables");
        return Ok(Vec::new());
    };
    let tick = millis_per_tick(menu);

    let mut built = Vec::with_capacity(masks.len());
    for (name, section) in masks {
        let section = section.as_table().ok_or_else(|| ConfigError::InvalidSection {
            mask: name.clone(),
        })?;
        built.push(build_mask(name, section, ctx, tick)?);
    }
    tracing::info!(owner = %ctx.owner, count = built.len(), "built masks");
    Ok(built)
}

/// Build one mask from its section.
pub fn build_mask(
    name: &str,
    section: &TemplateMap,
    ctx: &MaskContext,
    millis_per_tick: u64,
) -> Result<MaskRef, ConfigError> {
    let kind_name = section
        .get("type")
        .and_then(Template::as_str)
        .ok_or_else(|| ConfigError::MissingType {
            mask: name.to_string(),
        })?;
    let kind = MaskKind::from_name(kind_name).ok_or_else(|| ConfigError::UnknownType {
        mask: name.to_string(),
        kind: kind_name.to_string(),
    })?;
    tracing::debug!(mask = name, kind = kind.as_str(), "building mask");

    let template_error = |source: TemplateError| ConfigError::Template {
        mask: name.to_string(),
        source,
    };

    let mask: MaskRef = match kind {
        MaskKind::PlayerList => {
            let players = ctx
                .players
                .clone()
                .ok_or_else(|| ConfigError::MissingPlayers {
                    mask: name.to_string(),
                })?;
            register_current_resolver(&ctx.variables);

            let mut domain = PlayerListDomain::new(players)
                .with_exclude_viewer(flag_or(section, &["exclude-viewer"], false));
            let condition = lines(section, &["player-condition"]);
            if !condition.is_empty() {
                let condition_name = format!("{name}_player_condition");
                let condition = ctx.conditions.create(&ctx.owner, &condition_name, &condition);
                domain = domain.with_player_condition(condition);
            }
            let mask = ValueListMask::new(
                name,
                domain,
                value_list_template(section),
                value_list_settings(section, millis_per_tick),
                ctx,
            )
            .map_err(template_error)?;
            Arc::new(mask)
        }
        MaskKind::ValueList => {
            let mut domain = StaticValueDomain::new(lines(section, &["value", "values"]));
            if let Some(prefix) = get_if_found(section, &["shortcut"]).and_then(Template::as_str) {
                domain = domain.with_prefix(prefix);
            }
            if domain.is_empty() {
                tracing::warn!(mask = name, "value list has no values");
            }
            let mask = ValueListMask::new(
                name,
                domain,
                value_list_template(section),
                value_list_settings(section, millis_per_tick),
                ctx,
            )
            .map_err(template_error)?;
            Arc::new(mask)
        }
        MaskKind::Animated => {
            let mut frames = Vec::new();
            if let Some(children) = section.get("child").and_then(Template::as_table) {
                for (child, child_section) in children {
                    let child_name = format!("{name}_{child}");
                    let child_section =
                        child_section
                            .as_table()
                            .ok_or_else(|| ConfigError::InvalidSection {
                                mask: child_name.clone(),
                            })?;
                    frames.push(build_mask(&child_name, child_section, ctx, millis_per_tick)?);
                }
            }
            Arc::new(AnimatedMask::new(
                name,
                frames,
                animated_settings(section),
                Arc::clone(&ctx.scheduler),
            ))
        }
    };
    Ok(mask)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_menu;
    use crate::testing::{harness, labels};
    use ulid::Ulid;

    const MENU: &str = r#"
millis-per-tick = 10

[mask.colors]
type = "value-list"
value = ["red", "green", "red"]
shortcut = "color"
async = false
[mask.colors.button]
label = "{color_index}. {color}"

[mask.online]
type = "players"
exclude-viewer = "true"
async = false
[mask.online.template]
label = "{current_player}"

[mask.banner]
type = "animated"
update = 2
async = false
[mask.banner.child.first]
type = "value-list"
value = "A"
async = false
[mask.banner.child.first.button]
label = "{current_value}"
[mask.banner.child.second]
type = "value-list"
value = "B"
async = false
[mask.banner.child.second.button]
label = "{current_value}"
"#;

    #[test]
    fn test_build_menu() {
        let h = harness();
        let menu = parse_menu(MENU).unwrap();
        let masks = build_masks(&menu, &h.ctx).unwrap();
        let names: Vec<&str> = masks.iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["colors", "online", "banner"]);
        assert!(h.vars.is_registered("current_"));

        let viewer = Ulid::new();
        h.players.join(viewer);
        let other = Ulid::new();
        h.players.join(other);
        for mask in &masks {
            mask.init();
        }
        h.scheduler.tick();

        assert_eq!(labels(&masks[0].buttons(viewer)), vec!["1. red", "2. green"]);
        assert_eq!(
            labels(&masks[1].buttons(viewer)),
            vec![format!("{{current_{other};player}}")]
        );
        assert_eq!(labels(&masks[2].buttons(viewer)), vec!["A"]);

        for mask in &masks {
            mask.stop();
        }
        assert!(masks.iter().all(|m| m.buttons(viewer).is_empty()));
    }

    #[test]
    fn test_structural_errors() {
        let h = harness();

        let menu = parse_menu("[mask.x]\nvalue = 1").unwrap();
        assert!(matches!(
            build_masks(&menu, &h.ctx),
            Err(ConfigError::MissingType { mask }) if mask == "x"
        ));

        let menu = parse_menu("[mask.x]\ntype = \"carousel\"").unwrap();
        assert!(matches!(
            build_masks(&menu, &h.ctx),
            Err(ConfigError::UnknownType { kind, .. }) if kind == "carousel"
        ));

        let menu = parse_menu("mask = { x = 3 }").unwrap();
        assert!(matches!(
            build_masks(&menu, &h.ctx),
            Err(ConfigError::InvalidSection { .. })
        ));
    }

    #[test]
    fn test_player_list_needs_directory() {
        let h = harness();
        let mut ctx = h.ctx.clone();
        ctx.players = None;
        let menu = parse_menu("[mask.online]\ntype = \"player-list\"").unwrap();
        assert!(matches!(
            build_masks(&menu, &ctx),
            Err(ConfigError::MissingPlayers { .. })
        ));
    }

    #[test]
    fn test_no_masks() {
        let h = harness();
        assert!(build_masks(&TemplateMap::new(), &h.ctx).unwrap().is_empty());
    }
}
